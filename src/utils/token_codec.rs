//! Salt-keyed reversible encoding between numeric ids and short tokens.
//!
//! The encoding is Hashids-compatible: the alphabet is permuted by the salt,
//! re-shuffled per token with a lottery character, and the id is written as a
//! positional number in that shuffled alphabet. Separator and guard characters
//! are carved out of the alphabet so tokens can be validated on decode.
//!
//! A [`TokenCodec`] is built once for a salt and is then immutable, so it can
//! be shared across tasks behind an `Arc` without locking.
//!
//! # Examples
//!
//! ```ignore
//! let codec = TokenCodec::new("this is my salt");
//! assert_eq!(codec.generate(12345), "NkK9");
//! assert_eq!(codec.reverse("NkK9"), Some(12345));
//! assert_eq!(codec.reverse("not-a-token!!"), None);
//! ```

const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";

/// Target ratio between alphabet and separator counts.
const SEPARATOR_RATIO: f64 = 3.5;

/// One guard character per this many alphabet characters.
const GUARD_RATIO: f64 = 12.0;

/// Salt-derived tables used to encode and decode tokens.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
}

impl TokenCodec {
    /// Builds a codec for `salt` with no minimum token length.
    pub fn new(salt: &str) -> Self {
        Self::with_min_length(salt, 0)
    }

    /// Builds a codec for `salt` whose tokens are padded to at least
    /// `min_length` characters.
    pub fn with_min_length(salt: &str, min_length: usize) -> Self {
        let salt: Vec<char> = salt.chars().collect();

        let mut alphabet: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|c| alphabet.contains(c))
            .collect();
        alphabet.retain(|c| !separators.contains(c));

        consistent_shuffle(&mut separators, &salt);

        if separators.is_empty()
            || alphabet.len() as f64 / separators.len() as f64 > SEPARATOR_RATIO
        {
            let mut wanted = (alphabet.len() as f64 / SEPARATOR_RATIO).ceil() as usize;
            if wanted == 1 {
                wanted += 1;
            }

            if wanted > separators.len() {
                let missing = wanted - separators.len();
                separators.extend(alphabet.drain(..missing));
            } else {
                separators.truncate(wanted);
            }
        }

        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = (alphabet.len() as f64 / GUARD_RATIO).ceil() as usize;
        let guards: Vec<char> = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Self {
            salt,
            min_length,
            alphabet,
            separators,
            guards,
        }
    }

    /// Encodes `id` into a token. Deterministic for a given salt.
    pub fn generate(&self, id: u64) -> String {
        self.encode(&[id])
    }

    /// Decodes a token produced by [`Self::generate`] under the same salt.
    ///
    /// Returns `None` for empty or malformed tokens, characters outside the
    /// alphabet, tokens carrying zero or several numbers, overflowing values,
    /// and tokens that were not produced under this salt.
    pub fn reverse(&self, token: &str) -> Option<u64> {
        match self.decode(token)?.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    fn encode(&self, numbers: &[u64]) -> String {
        let numbers_hash = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| n % (i as u64 + 100))
            .sum::<u64>();

        let mut alphabet = self.alphabet.clone();
        let lottery = alphabet[(numbers_hash % alphabet.len() as u64) as usize];
        let mut token = vec![lottery];

        for (i, &number) in numbers.iter().enumerate() {
            self.reshuffle(&mut alphabet, lottery);

            let last = to_digits(number, &alphabet);
            let first = last[0];
            token.extend(last);

            if i + 1 < numbers.len() {
                let index = number % (first as u64 + i as u64);
                token.push(self.separators[(index % self.separators.len() as u64) as usize]);
            }
        }

        if token.len() < self.min_length {
            let index = (numbers_hash + token[0] as u64) % self.guards.len() as u64;
            token.insert(0, self.guards[index as usize]);

            if token.len() < self.min_length {
                let index = (numbers_hash + token[2] as u64) % self.guards.len() as u64;
                token.push(self.guards[index as usize]);
            }
        }

        let half = alphabet.len() / 2;
        while token.len() < self.min_length {
            let salt = alphabet.clone();
            consistent_shuffle(&mut alphabet, &salt);

            let mut padded = Vec::with_capacity(alphabet.len() + token.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&token);
            padded.extend_from_slice(&alphabet[..half]);
            token = padded;

            if token.len() > self.min_length {
                let start = (token.len() - self.min_length) / 2;
                token = token[start..start + self.min_length].to_vec();
            }
        }

        token.into_iter().collect()
    }

    fn decode(&self, token: &str) -> Option<Vec<u64>> {
        let chars: Vec<char> = token.chars().collect();
        if chars.is_empty() {
            return None;
        }

        let parts: Vec<&[char]> = chars.split(|c| self.guards.contains(c)).collect();
        let body = match parts.len() {
            2 | 3 => parts[1],
            _ => parts[0],
        };

        let (&lottery, rest) = body.split_first()?;
        let mut alphabet = self.alphabet.clone();
        let mut numbers = Vec::new();

        for chunk in rest.split(|c| self.separators.contains(c)) {
            self.reshuffle(&mut alphabet, lottery);
            numbers.push(from_digits(chunk, &alphabet)?);
        }

        // Tokens forged from another salt or re-ordered guards decode to
        // numbers that do not encode back to the same text.
        (self.encode(&numbers) == token).then_some(numbers)
    }

    fn reshuffle(&self, alphabet: &mut [char], lottery: char) {
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        buffer.push(lottery);
        buffer.extend_from_slice(&self.salt);
        buffer.extend_from_slice(alphabet);
        buffer.truncate(alphabet.len());
        consistent_shuffle(alphabet, &buffer);
    }
}

/// Encodes `id` with [`TokenCodec::new`] under `salt`.
///
/// Prefer building one [`TokenCodec`] at startup; this rebuilds the tables on
/// every call.
pub fn generate(salt: &str, id: u64) -> String {
    TokenCodec::new(salt).generate(id)
}

/// Decodes `token` with [`TokenCodec::new`] under `salt`.
pub fn reverse(salt: &str, token: &str) -> Option<u64> {
    TokenCodec::new(salt).reverse(token)
}

fn consistent_shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }

    let mut v = 0usize;
    let mut p = 0usize;

    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let integer = salt[v] as usize;
        p += integer;
        let j = (integer + v + p) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

fn to_digits(mut number: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();

    loop {
        digits.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }

    digits.reverse();
    digits
}

fn from_digits(digits: &[char], alphabet: &[char]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }

    let base = alphabet.len() as u64;
    digits.iter().try_fold(0u64, |acc, c| {
        let position = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(position)
    })
}

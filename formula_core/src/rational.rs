// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Exact mixed-fraction arithmetic, built on a persistent, monotonically
//! growing [`PrimeCache`] rather than Euclid's algorithm — `gcd`/`lcm` are
//! derived from prime factorizations.
//!
//! # Negative integer parts
//!
//! `(I, N, D)` denotes `I + N/D`. `toImproper((I,N,D)) = (0, N + I*D, D)` is
//! taken as a literal formula, which is the "algebraic" reading of a
//! negative integer part (`(-2,1,3) = -2 + 1/3 = -5/3`), not the
//! sign-toward-zero reading (`-(2 + 1/3) = -7/3`). [`reduce_frac`]
//! generalizes the migration of `N >= D` into `I` to also migrate a
//! *negative* combined numerator via floor division, which is required once
//! subtraction routes through `toImproper`/combine/reduce and can produce a
//! negative numerator. Floor division keeps every canonical `(I, N, D)`
//! satisfying `0 <= N < D`, and is the natural generalization — not a
//! behavior change — of that migration step.

use std::fmt;

use regex::Regex;

/// A mixed fraction `(I, N, D)` denoting `I + N/D`, canonical when
/// `D >= 1`, `0 <= N < D`, and `gcd(N, D) = 1` (or `N = 0, D = 1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub i: i64,
    pub n: u64,
    pub d: u64,
}

impl Rational {
    pub fn from_integer(i: i64) -> Rational {
        Rational { i, n: 0, d: 1 }
    }

    pub fn is_zero(&self) -> bool {
        self.i == 0 && self.n == 0
    }

    /// `toImproper((I,N,D)) -> (0, N + I*D, D)`, returned as a signed
    /// numerator over `self.d`.
    pub fn to_improper_numerator(&self) -> i64 {
        self.n as i64 + self.i * self.d as i64
    }

    /// `(0, N + I*D, D)` as a [`Rational`] with `I` forced to `0`.
    pub fn to_improper(&self) -> Rational {
        Rational {
            i: 0,
            n: self.to_improper_numerator().unsigned_abs(),
            d: self.d,
        }
    }
}

impl fmt::Display for Rational {
    /// `stringifyFrac`: emits a decimal integer literal when `N = 0`,
    /// otherwise `I\frac{N}{D}` with the integer prefix elided when `I = 0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.n == 0 {
            write!(f, "{}", self.i)
        } else if self.i == 0 {
            write!(f, "\\frac{{{}}}{{{}}}", self.n, self.d)
        } else {
            write!(f, "{}\\frac{{{}}}{{{}}}", self.i, self.n, self.d)
        }
    }
}

/// A persistent, monotonically growing cache of primes in ascending order
/// with no gaps below the largest cached prime, plus the factorization and
/// gcd/lcm operations built on it. Not thread-safe; callers needing
/// concurrent access must guard a single cache with a lock.
#[derive(Clone, Debug, Default)]
pub struct PrimeCache {
    primes: Vec<u64>,
}

impl PrimeCache {
    pub fn new() -> PrimeCache {
        PrimeCache { primes: Vec::new() }
    }

    /// Extends the cache (via `primal`'s sieve) until its largest prime is
    /// at least `bound`, or until at least one prime has been cached if
    /// `bound` is `0`.
    fn extend_to(&mut self, bound: u64) {
        if self.primes.last().copied().unwrap_or(0) >= bound {
            return;
        }

        for p in primal::Primes::all().skip(self.primes.len()) {
            let p = p as u64;
            self.primes.push(p);
            if p >= bound {
                break;
            }
        }
    }

    /// `primeFactorization(v)`: `[]` for `v < 2`; otherwise the ascending
    /// list of prime factors with multiplicity, extending the persistent
    /// cache as needed.
    pub fn factorize(&mut self, v: u64) -> Vec<u64> {
        if v < 2 {
            return Vec::new();
        }

        let bound = isqrt(v);
        self.extend_to(bound);

        let mut idx = 0;
        while idx < self.primes.len() && self.primes[idx] <= bound {
            let p = self.primes[idx];
            if v % p == 0 {
                let mut factors = vec![p];
                factors.extend(self.factorize(v / p));
                return factors;
            }
            idx += 1;
        }

        // No factor <= floor(sqrt(v)) found: v is itself prime.
        if self.primes.last().copied() != Some(v) {
            self.primes.push(v);
            self.primes.sort_unstable();
            self.primes.dedup();
        }

        vec![v]
    }

    /// `gcd(a,b)`: multiplies into `g` every prime factor of `a` (with
    /// multiplicity) that also divides the current residual of `b`.
    pub fn gcd(&mut self, a: u64, b: u64) -> u64 {
        if a == 0 {
            return b;
        }
        if b == 0 {
            return a;
        }

        let mut residual = b;
        let mut g = 1u64;

        for p in self.factorize(a) {
            if p != 0 && residual % p == 0 {
                g *= p;
                residual /= p;
            }
        }

        g
    }

    /// Variadic reduction of [`PrimeCache::gcd`] over a list.
    pub fn gcd_many(&mut self, values: &[u64]) -> u64 {
        values
            .iter()
            .copied()
            .fold(0, |acc, v| if acc == 0 { v } else { self.gcd(acc, v) })
    }

    /// `lcm(a,b) = (a / gcd(a,b)) * b` (divide first to bound intermediate size).
    pub fn lcm(&mut self, a: u64, b: u64) -> u64 {
        if a == 0 || b == 0 {
            return 0;
        }
        (a / self.gcd(a, b)) * b
    }

    /// Variadic reduction of [`PrimeCache::lcm`] over a list.
    pub fn lcm_many(&mut self, values: &[u64]) -> u64 {
        values
            .iter()
            .copied()
            .fold(1, |acc, v| self.lcm(acc, v))
    }
}

fn isqrt(v: u64) -> u64 {
    (v as f64).sqrt().floor() as u64
}

/// `reduceFrac`, generalized to a possibly-negative combined numerator
/// (see module docs): migrates whole multiples of `d` from `n` into `i` via
/// floor division, then divides `n` and `d` by their gcd.
pub fn reduce_frac(cache: &mut PrimeCache, i: i64, n: i64, d: u64) -> Rational {
    if n == 0 {
        return Rational { i, n: 0, d: 1 };
    }

    let d_signed = d as i64;
    let whole = n.div_euclid(d_signed);
    let remainder = n.rem_euclid(d_signed) as u64;
    let i = i + whole;

    if remainder == 0 {
        return Rational { i, n: 0, d: 1 };
    }

    let g = cache.gcd(remainder, d);
    Rational {
        i,
        n: remainder / g,
        d: d / g,
    }
}

/// `commonDenominator(fracs)`: returns each fraction rewritten with the
/// same denominator `lcm(D_i)`, numerator scaled accordingly. Integer
/// parts are left untouched (not folded into the numerator), matching the
/// pairwise-add algorithm used for combining fractions.
pub fn common_denominator(cache: &mut PrimeCache, fracs: &[Rational]) -> (Vec<Rational>, u64) {
    let denominators: Vec<u64> = fracs.iter().map(|r| r.d).collect();
    let l = cache.lcm_many(&denominators);

    let scaled = fracs
        .iter()
        .map(|r| Rational {
            i: r.i,
            n: r.n * (l / r.d),
            d: l,
        })
        .collect();

    (scaled, l)
}

pub fn add(cache: &mut PrimeCache, a: Rational, b: Rational) -> Rational {
    let (scaled, l) = common_denominator(cache, &[a, b]);
    reduce_frac(cache, scaled[0].i + scaled[1].i, scaled[0].n as i64 + scaled[1].n as i64, l)
}

pub fn sub(cache: &mut PrimeCache, a: Rational, b: Rational) -> Rational {
    let (scaled, l) = common_denominator(cache, &[a, b]);
    let numerator_a = scaled[0].n as i64 + scaled[0].i * l as i64;
    let numerator_b = scaled[1].n as i64 + scaled[1].i * l as i64;
    reduce_frac(cache, 0, numerator_a - numerator_b, l)
}

pub fn mul(cache: &mut PrimeCache, a: Rational, b: Rational) -> Rational {
    let numerator_a = a.to_improper_numerator();
    let numerator_b = b.to_improper_numerator();
    let d = a.d * b.d;
    reduce_frac(cache, 0, numerator_a * numerator_b, d)
}

pub fn div(cache: &mut PrimeCache, a: Rational, b: Rational) -> Option<Rational> {
    let numerator_a = a.to_improper_numerator();
    let numerator_b = b.to_improper_numerator();

    if numerator_b == 0 {
        return None;
    }

    // Cross-multiply: (na/da) / (nb/db) = na*db / (da*nb).
    let numerator = numerator_a * b.d as i64;
    let denominator = a.d as i64 * numerator_b;

    let (numerator, denominator) = if denominator < 0 {
        (-numerator, (-denominator) as u64)
    } else {
        (numerator, denominator as u64)
    };

    Some(reduce_frac(cache, 0, numerator, denominator))
}

/// `parseFrac(s)`: matches `integer?\frac{num}{den}` where each of the
/// three groups is a run of word characters.
pub fn parse_frac(s: &str) -> Option<Rational> {
    lazy_static::lazy_static! {
        static ref FRAC: Regex =
            Regex::new(r"^(-?\w*?)\\frac\{(\w+)\}\{(\w+)\}$").unwrap();
    }

    let captures = FRAC.captures(s)?;
    let integer_part = &captures[1];
    let n = captures[2].parse::<u64>().ok()?;
    let d = captures[3].parse::<u64>().ok()?;

    if d == 0 {
        return None;
    }

    let i = match integer_part {
        "" | "-" => 0,
        _ => integer_part.parse::<i64>().ok()?,
    };

    Some(Rational { i, n, d })
}

/// `floatToFrac(s)`: parses a decimal `I.F`, with `D = 10^len(F)` and
/// `N = round((v - I) * D)`.
pub fn float_to_frac(cache: &mut PrimeCache, s: &str) -> Option<Rational> {
    if s.is_empty() {
        return None;
    }

    let negative = s.starts_with('-');
    let unsigned = s.strip_prefix('-').unwrap_or(s);

    let (integer_part, fractional_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => {
            let i = unsigned.parse::<i64>().ok()?;
            return Some(Rational {
                i: if negative { -i } else { i },
                n: 0,
                d: 1,
            });
        }
    };

    if fractional_part.is_empty() || !fractional_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !integer_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let i: i64 = if integer_part.is_empty() {
        0
    } else {
        integer_part.parse().ok()?
    };

    let d = 10u64.checked_pow(fractional_part.len() as u32)?;
    let n: u64 = fractional_part.parse().ok()?;

    let rational = reduce_frac(cache, if negative { -i } else { i }, if negative { -(n as i64) } else { n as i64 }, d);
    Some(rational)
}

/// Largest denominator for which [`decimal_digits`] will produce a finite
/// decimal string: at most 10 fractional digits.
pub const MAX_DECIMAL_DIGITS: u32 = 10;

/// Returns a decimal-literal string for `r` if `r.d` divides a power of ten
/// within [`MAX_DECIMAL_DIGITS`] digits, else `None`.
pub fn decimal_digits(r: &Rational) -> Option<String> {
    if r.n == 0 {
        return Some(r.i.to_string());
    }

    for digits in 1..=MAX_DECIMAL_DIGITS {
        let scale = 10u64.checked_pow(digits)?;
        if scale % r.d != 0 {
            continue;
        }

        let numerator = r.to_improper_numerator() * (scale as i64 / r.d as i64);
        let whole = numerator.div_euclid(scale as i64);
        let frac = numerator.rem_euclid(scale as i64);
        if frac == 0 {
            return Some(whole.to_string());
        }
        let frac_str = format!("{:0width$}", frac, width = digits as usize);
        let frac_str = frac_str.trim_end_matches('0');
        let frac_str = if frac_str.is_empty() { "0" } else { frac_str };
        return Some(format!("{}.{}", whole, frac_str));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prime_factorization_examples() {
        let mut cache = PrimeCache::new();
        assert_eq!(cache.factorize(60), vec![2, 2, 3, 5]);
        assert_eq!(cache.factorize(1), Vec::<u64>::new());
        assert_eq!(cache.factorize(0), Vec::<u64>::new());
        assert_eq!(cache.factorize(17), vec![17]);
    }

    #[test]
    fn gcd_lcm_examples() {
        let mut cache = PrimeCache::new();
        assert_eq!(cache.gcd(12, 18), 6);
        assert_eq!(cache.lcm(4, 6), 12);
    }

    #[test]
    fn gcd_of_factorization_product_equals_value() {
        let mut cache = PrimeCache::new();
        for v in 2u64..200 {
            let product: u64 = cache.factorize(v).iter().product();
            assert_eq!(product, v);
        }
    }

    #[test]
    fn reduce_frac_basic() {
        let mut cache = PrimeCache::new();
        let r = reduce_frac(&mut cache, 0, 4, 8);
        assert_eq!(r, Rational { i: 0, n: 1, d: 2 });
    }

    #[test]
    fn reduce_frac_migrates_whole_multiples() {
        let mut cache = PrimeCache::new();
        let r = reduce_frac(&mut cache, 0, 7, 3);
        assert_eq!(r, Rational { i: 2, n: 1, d: 3 });
    }

    #[test]
    fn reduce_frac_handles_negative_numerator() {
        let mut cache = PrimeCache::new();
        // -5/3 = -2 + 1/3
        let r = reduce_frac(&mut cache, 0, -5, 3);
        assert_eq!(r, Rational { i: -2, n: 1, d: 3 });
    }

    #[test]
    fn add_examples() {
        let mut cache = PrimeCache::new();
        // 1/2 + 1/3 = 5/6
        let a = Rational { i: 0, n: 1, d: 2 };
        let b = Rational { i: 0, n: 1, d: 3 };
        assert_eq!(add(&mut cache, a, b), Rational { i: 0, n: 5, d: 6 });
    }

    #[test]
    fn sub_examples() {
        let mut cache = PrimeCache::new();
        let a = Rational { i: 1, n: 1, d: 3 }; // 4/3
        let b = Rational { i: 0, n: 1, d: 2 }; // 1/2
        // 4/3 - 1/2 = 5/6
        assert_eq!(sub(&mut cache, a, b), Rational { i: 0, n: 5, d: 6 });
    }

    #[test]
    fn mul_div_examples() {
        let mut cache = PrimeCache::new();
        let a = Rational { i: 0, n: 1, d: 2 };
        let b = Rational { i: 0, n: 2, d: 3 };
        assert_eq!(mul(&mut cache, a, b), Rational { i: 0, n: 1, d: 3 });
        assert_eq!(div(&mut cache, a, b).unwrap(), Rational { i: 0, n: 3, d: 4 });
    }

    #[test]
    fn div_by_zero_is_none() {
        let mut cache = PrimeCache::new();
        let a = Rational::from_integer(1);
        let zero = Rational::from_integer(0);
        assert_eq!(div(&mut cache, a, zero), None);
    }

    #[test]
    fn parse_frac_roundtrip() {
        let r = parse_frac("2\\frac{1}{3}").unwrap();
        assert_eq!(r, Rational { i: 2, n: 1, d: 3 });
        assert_eq!(r.to_string(), "2\\frac{1}{3}");

        let improper = parse_frac("\\frac{5}{6}").unwrap();
        assert_eq!(improper, Rational { i: 0, n: 5, d: 6 });
        assert_eq!(improper.to_string(), "\\frac{5}{6}");
    }

    #[test]
    fn float_to_frac_examples() {
        let mut cache = PrimeCache::new();
        assert_eq!(
            float_to_frac(&mut cache, "0.5").unwrap(),
            Rational { i: 0, n: 1, d: 2 }
        );
        assert_eq!(
            float_to_frac(&mut cache, "1.5").unwrap(),
            Rational { i: 1, n: 1, d: 2 }
        );
        assert_eq!(
            float_to_frac(&mut cache, "7").unwrap(),
            Rational::from_integer(7)
        );
    }

    #[test]
    fn stringify_integer_when_n_is_zero() {
        assert_eq!(Rational::from_integer(5).to_string(), "5");
        assert_eq!(Rational::from_integer(-5).to_string(), "-5");
    }

    #[test]
    fn decimal_digits_examples() {
        let half = Rational { i: 0, n: 1, d: 2 };
        assert_eq!(decimal_digits(&half), Some("0.5".to_owned()));

        let third = Rational { i: 0, n: 1, d: 3 };
        assert_eq!(decimal_digits(&third), None);
    }
}

use std::fmt::Display;

/// Running summary of a set of non-negative integer samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f32,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.mean += (value as f32 - self.mean) / (self.count as f32);
    }

    pub fn merge(&self, other: &Self) -> Self {
        let count = self.count + other.count;
        Stats {
            count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            mean: if count > 0 {
                (self.mean * self.count as f32 + other.mean * other.count as f32) / count as f32
            } else {
                0.0
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            mean: 0.0,
        }
    }
}

impl Extend<usize> for Stats {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for value in iter {
            self.add_sample(value);
        }
    }
}

impl FromIterator<usize> for Stats {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut stats = Stats::default();
        stats.extend(iter);
        stats
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{} - {}; avg {:.1}; {} samples",
            self.min, self.max, self.mean, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn collect() {
        let s: Stats = [4, 10, 1].into_iter().collect();
        assert!(s.count == 3);
        assert!(s.min == 1);
        assert!(s.max == 10);
        assert!(s.mean == 5.0);
    }

    #[test]
    fn merge_stats() {
        let a: Stats = [10].into_iter().collect();
        let b: Stats = [30, 50].into_iter().collect();
        let m = a.merge(&b);
        assert!(m == [10, 30, 50].into_iter().collect());
        assert!(m.mean == 30.0);
    }

    #[test]
    fn merge_with_empty() {
        let s: Stats = [5].into_iter().collect();
        assert!(Stats::default().merge(&s) == s);
        assert!(Stats::default().merge(&Stats::default()) == Stats::default());
    }

    #[test]
    fn display_format() {
        let s: Stats = [42].into_iter().collect();
        assert!(s.to_string() == "42 - 42; avg 42.0; 1 samples");
        assert!(Stats::default().to_string() == "no samples");
    }
}

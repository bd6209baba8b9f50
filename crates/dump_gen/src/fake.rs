//! Fake column values in PostgreSQL COPY text format.
//!
//! Every value returned here is already escaped for a tab-separated COPY
//! row: tabs, newlines and backslashes appear as `\t`, `\n` and `\\`.

use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Iris", "Jack", "Kate",
    "Leo", "Maya", "Noah", "Olivia", "Peter", "Quinn", "Rose", "Sam", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Garcia", "Miller", "Davis", "O'Brien", "Martinez", "Taylor", "Moore",
    "D'Angelo", "Lee", "White", "Müller", "Hall", "Young", "Østergaard",
];

const WORDS: &[&str] = &[
    "widget", "order", "pending", "shipped", "it's", "naïve", "café", "delta", "summit", "spark",
    "flow", "core", "edge", "日本", "prime", "wave",
];

pub struct FakeValues<'a, R: Rng> {
    rng: &'a mut R,
}

impl<'a, R: Rng> FakeValues<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, list: &[&'static str]) -> &'static str {
        list[self.rng.gen_range(0..list.len())]
    }

    pub fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    pub fn email(&mut self, id: usize) -> String {
        let first = self.pick(FIRST_NAMES).to_lowercase();
        format!("{}{}@example.com", first, id)
    }

    /// Free text, sometimes carrying COPY escapes
    pub fn note(&mut self) -> String {
        let count = self.rng.gen_range(1..5);
        let words: Vec<&str> = (0..count).map(|_| self.pick(WORDS)).collect();
        let mut text = words.join(" ");
        match self.rng.gen_range(0..8) {
            0 => text.push_str("\\nsecond line"),
            1 => text.push_str("\\tindented"),
            2 => text.push_str(" C:\\\\temp"),
            _ => {}
        }
        text
    }

    pub fn amount(&mut self) -> String {
        format!("{}.{:02}", self.rng.gen_range(0..10_000), self.rng.gen_range(0..100))
    }

    pub fn date(&mut self) -> String {
        format!(
            "20{:02}-{:02}-{:02}",
            self.rng.gen_range(15..26),
            self.rng.gen_range(1..13),
            self.rng.gen_range(1..29)
        )
    }

    pub fn flag(&mut self) -> &'static str {
        if self.rng.gen_bool(0.5) {
            "t"
        } else {
            "f"
        }
    }

    /// `\N` with the given probability, otherwise the value
    pub fn nullable(&mut self, value: String, probability: f64) -> String {
        if self.rng.gen_bool(probability) {
            "\\N".to_string()
        } else {
            value
        }
    }
}

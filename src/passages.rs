use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;

static TEXT_DIR: Dir = include_dir!("src/texts");

/// Fixed corpus of practice passages, embedded at compile time.
#[derive(Deserialize, Clone, Debug)]
pub struct PassageSet {
    pub name: String,
    passages: Vec<String>,
}

impl PassageSet {
    pub fn load() -> Self {
        let file = TEXT_DIR
            .get_file("english.json")
            .expect("passage file not found");

        let raw = file
            .contents_utf8()
            .expect("unable to interpret passage file as a string");

        serde_json::from_str(raw).expect("unable to deserialize passage json")
    }

    /// Uniform random pick. Callers treat the result as opaque reference
    /// text.
    pub fn choose_random(&self) -> &str {
        self.passages
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .expect("passage corpus is empty")
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded_corpus() {
        let set = PassageSet::load();

        assert_eq!(set.name, "english");
        assert!(!set.is_empty());
        assert!(set.passages().iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_choose_random_returns_member() {
        let set = PassageSet::load();

        for _ in 0..20 {
            let picked = set.choose_random();
            assert!(set.passages().iter().any(|p| p == picked));
        }
    }

    #[test]
    fn test_passages_are_single_line() {
        // The typing screen renders passages as one wrapped paragraph
        let set = PassageSet::load();
        assert!(set.passages().iter().all(|p| !p.contains('\n')));
    }

    #[test]
    fn test_deserialization_shape() {
        let json = r#"{ "name": "mini", "passages": ["one", "two"] }"#;
        let set: PassageSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.name, "mini");
        assert_eq!(set.len(), 2);
    }
}

//! List state with case-insensitive substring filtering and highlighting.

use dpav_client::{Breed, Dog, Id};
use serde::Serialize;

/// Something a list can be filtered on.
pub trait Searchable {
    /// Texts matched against the search term.
    fn haystacks(&self) -> Vec<&str>;

    fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self
                .haystacks()
                .iter()
                .any(|h| h.to_lowercase().contains(&needle))
    }
}

impl Searchable for Breed {
    fn haystacks(&self) -> Vec<&str> {
        vec![&self.nombre]
    }
}

/// A dog as listed: the record plus its resolved breed name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DogRow {
    #[serde(flatten)]
    pub dog: Dog,
    pub breed_name: String,
}

impl DogRow {
    pub fn new(dog: Dog, breeds: &[Breed]) -> Self {
        let breed_name = dog.breed_name(breeds);
        Self { dog, breed_name }
    }

    pub fn id(&self) -> &Id {
        &self.dog.id
    }

    pub fn summary(&self) -> String {
        format!("Color: {} | Edad: {} años", self.dog.color, self.dog.edad)
    }
}

impl Searchable for DogRow {
    fn haystacks(&self) -> Vec<&str> {
        vec![&self.dog.nombre, &self.breed_name]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub all: Vec<T>,
    pub filtered: Vec<T>,
    pub term: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            term: String::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T: Searchable + Clone> ListState<T> {
    /// Swap in a freshly fetched collection, keeping the current term.
    pub fn replace(&mut self, all: Vec<T>) {
        self.all = all;
        self.error = None;
        self.refilter();
    }

    pub fn set_filter(&mut self, term: &str) {
        self.term = term.to_string();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = self
            .all
            .iter()
            .filter(|item| item.matches(&self.term))
            .cloned()
            .collect();
    }

    /// Nothing to show and nothing pending.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.error.is_none() && self.filtered.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Split `text` into runs that do and do not match `term`,
/// case-insensitively. Concatenating the segments yields `text`.
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    let needle: Vec<char> = term.trim().chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() || text.is_empty() {
        return plain(text);
    }

    // Compare on lowercase chars, but slice the original by byte offsets.
    // Chars whose lowercase form expands are compared by their first char.
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let folded: Vec<char> = chars
        .iter()
        .map(|(_, c)| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let mut segments = Vec::new();
    let mut plain_from = 0;
    let mut i = 0;
    while i + needle.len() <= folded.len() {
        if folded[i..i + needle.len()] == needle[..] {
            let start = chars[i].0;
            let end = chars.get(i + needle.len()).map(|(b, _)| *b).unwrap_or(text.len());
            if plain_from < start {
                segments.push(Segment { text: text[plain_from..start].to_string(), matched: false });
            }
            segments.push(Segment { text: text[start..end].to_string(), matched: true });
            plain_from = end;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    if plain_from < text.len() {
        segments.push(Segment { text: text[plain_from..].to_string(), matched: false });
    }
    segments
}

fn plain(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![Segment { text: text.to_string(), matched: false }]
}

//! Minimal glob matching over path components: `*`, `?`, and `**`.

use camino::{Utf8Path, Utf8PathBuf};

pub(crate) struct Pattern {
    segments: Vec<Segment>,
}

enum Segment {
    /// `**`: matches any number of components, including none.
    Recursive,
    /// A single component, possibly containing `*` and `?`.
    Component(String),
}

impl Pattern {
    pub(crate) fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(|segment| {
                if segment == "**" {
                    Segment::Recursive
                } else {
                    Segment::Component(segment.to_owned())
                }
            })
            .collect();
        Self { segments }
    }

    /// The longest literal directory prefix, used as the walk root.
    pub(crate) fn literal_prefix(&self) -> Utf8PathBuf {
        let mut prefix = Utf8PathBuf::new();
        for segment in &self.segments {
            match segment {
                Segment::Component(text) if !text.contains(['*', '?']) => prefix.push(text),
                _ => break,
            }
        }
        prefix
    }

    pub(crate) fn matches(&self, path: &Utf8Path) -> bool {
        let components: Vec<&str> = path
            .components()
            .map(|component| component.as_str())
            .filter(|component| *component != "." && *component != "/")
            .collect();
        matches_from(&self.segments, &components)
    }
}

fn matches_from(segments: &[Segment], components: &[&str]) -> bool {
    match segments.split_first() {
        None => components.is_empty(),
        Some((Segment::Recursive, rest)) => (0..=components.len())
            .any(|skipped| matches_from(rest, &components[skipped..])),
        Some((Segment::Component(text), rest)) => match components.split_first() {
            Some((component, remaining)) => {
                component_matches(text, component) && matches_from(rest, remaining)
            }
            None => false,
        },
    }
}

fn component_matches(pattern: &str, component: &str) -> bool {
    fn matches(pattern: &[char], component: &[char]) -> bool {
        match pattern.split_first() {
            None => component.is_empty(),
            Some(('*', rest)) => {
                (0..=component.len()).any(|skipped| matches(rest, &component[skipped..]))
            }
            Some(('?', rest)) => match component.split_first() {
                Some((_, remaining)) => matches(rest, remaining),
                None => false,
            },
            Some((expected, rest)) => match component.split_first() {
                Some((actual, remaining)) => expected == actual && matches(rest, remaining),
                None => false,
            },
        }
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let component: Vec<char> = component.chars().collect();
    matches(&pattern, &component)
}

//! Splitting prose replies into named sections.
//!
//! Prompts ask for labelled sections (`## Fundamentals`); models comply most
//! of the time but vary the heading level, add bold or a trailing colon, or
//! write `Summary: ...` inline. Matching is on the normalized label text.

use lp_core::MiniModuleContent;

const FIRST_PRINCIPLES: &str = "first principles";
const FUNDAMENTAL_TRUTHS: &str = "fundamental truths";
const CROSS_DOMAIN: &str = "cross domain connections";

const DESCRIPTION: &str = "description";
const FUNDAMENTALS: &str = "fundamentals";
const SUMMARY: &str = "summary";

/// Section bodies for `labels`, in the same order; `None` where a label
/// never appeared. Also returns any text before the first label.
pub fn split_labeled(text: &str, labels: &[&str]) -> (String, Vec<Option<String>>) {
    let mut preamble = Vec::new();
    let mut bodies: Vec<Option<Vec<&str>>> = vec![None; labels.len()];
    let mut current: Option<usize> = None;

    for line in text.lines() {
        if let Some((index, inline)) = match_label(line, labels) {
            current = Some(index);
            let body = bodies[index].get_or_insert_with(Vec::new);
            if !inline.is_empty() {
                body.push(inline);
            }
            continue;
        }
        match current {
            Some(index) => bodies[index].get_or_insert_with(Vec::new).push(line),
            None => preamble.push(line)
        }
    }

    let bodies = bodies
        .into_iter()
        .map(|body| body.map(|lines| lines.join("\n").trim().to_string()))
        .collect();
    (preamble.join("\n").trim().to_string(), bodies)
}

/// Recognizes `## Label`, `**Label**`, `Label:` and `Label: inline text`.
fn match_label<'a>(line: &'a str, labels: &[&str]) -> Option<(usize, &'a str)> {
    let trimmed = line.trim();
    let is_heading = trimmed.starts_with('#');
    let stripped = trimmed.trim_start_matches('#').trim();

    let (head, inline) = match stripped.split_once(':') {
        Some((head, rest)) => (head, rest.trim()),
        None => (stripped, "")
    };
    let plain_head = head.replace("**", "");
    let plain_head = plain_head.trim();
    let had_colon = stripped.contains(':');
    let bolded = head.trim().starts_with("**");

    // A bare line equal to a label only counts when it is marked as one.
    if !(is_heading || had_colon || bolded) {
        return None;
    }

    let key = normalize_label(plain_head);
    let index = labels.iter().position(|label| normalize_label(label) == key)?;
    let inline = inline.trim_start_matches("**").trim();
    Some((index, inline))
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Blank-line separated paragraphs, trimmed, empties removed.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n").trim().to_string());
    }
    out
}

/// The three parts of a first-principles reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipleSections {
    pub first_principles: String,
    pub fundamental_truths: String,
    pub cross_domain_connections: String
}

/// Splits a first-principles reply by its section labels.
///
/// Labels the model omitted come back empty. Without a `First Principles`
/// label the text before the first recognized label is used, or the whole
/// reply when no label was recognized at all.
pub fn principle_sections(text: &str) -> PrincipleSections {
    let (preamble, bodies) = split_labeled(text, &[FIRST_PRINCIPLES, FUNDAMENTAL_TRUTHS, CROSS_DOMAIN]);
    let mut bodies = bodies.into_iter();
    let first = bodies.next().flatten();
    let truths = bodies.next().flatten();
    let connections = bodies.next().flatten();

    let first_principles = match (&first, &truths, &connections) {
        (Some(body), _, _) => body.clone(),
        (None, None, None) => text.trim().to_string(),
        (None, _, _) => preamble
    };

    PrincipleSections {
        first_principles,
        fundamental_truths: truths.unwrap_or_default(),
        cross_domain_connections: connections.unwrap_or_default()
    }
}

/// Mini-module sections by label, then by paragraph position.
///
/// Returns `None` when fewer than three non-empty sections can be recovered.
pub fn mini_module_sections(text: &str) -> Option<MiniModuleContent> {
    let (_, bodies) = split_labeled(text, &[DESCRIPTION, FUNDAMENTALS, SUMMARY]);
    if let [Some(description), Some(fundamentals), Some(summary)] = bodies.as_slice() {
        if !description.is_empty() && !fundamentals.is_empty() && !summary.is_empty() {
            return Some(MiniModuleContent {
                description: description.clone(),
                fundamentals: fundamentals.clone(),
                summary: summary.clone()
            });
        }
    }

    let mut parts = paragraphs(text)
        .into_iter()
        .filter(|p| !p.trim_start().starts_with('#'));
    let description = parts.next()?;
    let fundamentals = parts.next()?;
    let summary = parts.next()?;
    Some(MiniModuleContent {
        description,
        fundamentals,
        summary
    })
}

use crate::util::lowercase_prefix;

const UNKNOWN_CATEGORY: &str = "Unknown";
const DESCRIPTION_WINDOW_CHARS: usize = 2000;
const MAX_SENDER_TOKENS: usize = 2;
const MAX_DESCRIPTIONS: usize = 2;

const TOPIC_MARKERS: [(&str, &str); 3] = [
    ("familienzulagen", "Familienzulagen"),
    ("verwaltungswechsel", "Verwaltungswechsel"),
    ("fragebogen", "Fragebogen"),
];

/// Folder name for a sender identifier: `moebel_schubiger` -> `Moebel_Schubiger`, `UBS` -> `Ubs`.
///
/// Always a single path segment: separators and `.`/`..` components are dropped.
pub fn category_name(identifier: &str) -> String {
    let segment = identifier
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|part| !matches!(*part, "" | "." | ".."))
        .collect::<Vec<&str>>()
        .join("_");
    if segment.is_empty() {
        return UNKNOWN_CATEGORY.to_string();
    }

    title_case(&segment.replace('_', " ")).replace(' ', "_")
}

/// Human-readable filename stem; never influences how pages are split.
pub fn filename_stem(text: &str, identifier: &str, position: usize) -> String {
    let window = lowercase_prefix(text, DESCRIPTION_WINDOW_CHARS);

    let descriptions = describe(&window);
    let senders = sender_tokens(&window);

    let mut parts = Vec::<String>::new();
    parts.extend(senders.into_iter().take(MAX_SENDER_TOKENS));
    parts.extend(descriptions.into_iter().take(MAX_DESCRIPTIONS));

    if parts.is_empty() {
        parts.push(category_name(identifier));
        parts.push((position + 1).to_string());
    }

    parts.join("_")
}

fn describe(window: &str) -> Vec<String> {
    let mut descriptions = Vec::<String>::new();

    if window.contains("mietzins") || window.contains("rent") {
        descriptions.push("Mietzinsrechnung".to_string());
    } else if window.contains("rechnung") || window.contains("invoice") {
        descriptions.push("Rechnung".to_string());
    }

    for (marker, label) in TOPIC_MARKERS {
        if window.contains(marker) {
            descriptions.push(label.to_string());
        }
    }

    if descriptions.is_empty() && window.contains("mitteilung") {
        descriptions.push("Mitteilung".to_string());
    }

    descriptions
}

fn sender_tokens(window: &str) -> Vec<String> {
    let mut senders = Vec::<String>::new();

    if window.contains("mzp") {
        senders.push("MZP".to_string());
    }
    if window.contains("sva") && window.contains("zürich") {
        senders.push("SVA_Zurich".to_string());
    }
    if window.contains("ubs") {
        senders.push("UBS".to_string());
    }
    if window.contains("cornercard") {
        senders.push("Cornercard".to_string());
    }

    senders
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
fn title_case(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut previous_alphabetic = false;

    for character in input.chars() {
        if character.is_alphabetic() {
            if previous_alphabetic {
                output.extend(character.to_lowercase());
            } else {
                output.extend(character.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            output.push(character);
            previous_alphabetic = false;
        }
    }

    output
}

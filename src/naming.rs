//! Name-shaping helpers shared by the context extractor and both
//! code-generation backends.
//!
//! All of these are pure string transforms; codegen determinism depends
//! on them never consulting anything but their input.

/// `checkoutCart` / `CheckoutCart` / `checkout_cart` -> `checkout-cart`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == ' ' {
            if !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_matches('-').to_string()
}

/// Splits a camelCase or snake_case name into lowercase words:
/// `activeTodos` -> `["active", "todos"]`
pub fn split_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == ' ' || ch == '-' {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
        } else if ch.is_uppercase() && !current.is_empty() {
            words.push(current.to_lowercase());
            current = ch.to_lowercase().collect();
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current.to_lowercase());
    }
    words
}

/// `todos` -> `Todos`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `Todos` -> `todos`
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Naive pluralization, good enough for resource paths.
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with('x') || name.ends_with("ch") {
        format!("{}es", name)
    } else if let Some(stem) = name.strip_suffix('y') {
        if stem.ends_with(|c: char| "aeiou".contains(c)) {
            format!("{}s", name)
        } else {
            format!("{}ies", stem)
        }
    } else {
        format!("{}s", name)
    }
}

/// Inverse of [`pluralize`], same limitations.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = name.strip_suffix("es") {
        if stem.ends_with('x') || stem.ends_with("ch") || stem.ends_with('s') {
            stem.to_string()
        } else {
            name.strip_suffix('s').unwrap_or(name).to_string()
        }
    } else {
        name.strip_suffix('s').unwrap_or(name).to_string()
    }
}

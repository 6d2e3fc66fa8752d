// src/common/text.rs

/// Chave de comparação: sem acentos, minúscula e com espaços colapsados.
/// "  Campus  São João " -> "campus sao joao"
pub fn normalize_key(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| word.chars().flat_map(fold_char).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

// Remove diacríticos do alfabeto latino (português e espanhol) e baixa a caixa.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => return Folded::Many(other.to_lowercase()),
    };
    Folded::One(Some(folded))
}

enum Folded {
    One(Option<char>),
    Many(std::char::ToLowercase),
}

impl Iterator for Folded {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Folded::One(c) => c.take(),
            Folded::Many(it) => it.next(),
        }
    }
}

/// Remove espaços das pontas; string vazia vira `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize_key("Liberdade"), "liberdade");
        assert_eq!(normalize_key("  SÃO   João "), "sao joao");
        assert_eq!(normalize_key("Praça da Árvore"), "praca da arvore");
    }

    #[test]
    fn empty_strings_become_none() {
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(Some(" 101 ".into())), Some("101".into()));
        assert_eq!(non_empty(None), None);
    }
}

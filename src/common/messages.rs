// src/common/messages.rs

use crate::middleware::i18n::Locale;

// Textos exibidos ao visitante. Português é o padrão da landing page.
pub fn text(locale: &Locale, key: &str) -> &'static str {
    if locale.is_english() {
        english(key)
    } else {
        portuguese(key)
    }
}

fn portuguese(key: &str) -> &'static str {
    match key {
        "lead_created" => "Lead cadastrada com sucesso!",
        "invalid_data" => "Dados inválidos",
        "invalid_body" => "Corpo da requisição inválido",
        "email_exists" => "Este e-mail já está cadastrado em nossa lista de espera.",
        "count_failed" => "Erro ao obter contagem de leads",
        "not_found" => "Página não encontrada",
        "name_length" => "Nome deve ter entre 2 e 100 caracteres",
        "name_chars" => "Nome deve conter apenas letras e espaços",
        "invalid_email" => "E-mail inválido",
        "invalid_phone" => "Telefone deve estar no formato (11) 99999-9999",
        _ => "Erro interno do servidor. Tente novamente.",
    }
}

fn english(key: &str) -> &'static str {
    match key {
        "lead_created" => "Lead registered successfully!",
        "invalid_data" => "Invalid data",
        "invalid_body" => "Invalid request body",
        "email_exists" => "This e-mail is already on our waiting list.",
        "count_failed" => "Could not count leads",
        "not_found" => "Page not found",
        "name_length" => "Name must be between 2 and 100 characters",
        "name_chars" => "Name must contain only letters and spaces",
        "invalid_email" => "Invalid e-mail",
        "invalid_phone" => "Phone must match the format (11) 99999-9999",
        _ => "Internal server error. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_degrade_to_generic_error() {
        let pt = Locale::default();
        assert_eq!(text(&pt, "???"), "Erro interno do servidor. Tente novamente.");
    }

    #[test]
    fn english_locale_gets_english_text() {
        let en = Locale("en".into());
        assert_eq!(text(&en, "email_exists"), "This e-mail is already on our waiting list.");
    }
}

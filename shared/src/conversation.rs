//! Conversation assembly for the model invocation.

use crate::gemini::Content;
use crate::models::HistoryEntry;

/// Canned greeting presented as the assistant's first turn.
pub const GREETING: &str = "¡Hola! 👋 Soy el asistente virtual. Estoy aquí para contarte sobre las habilidades, proyectos y experiencia del desarrollador. ¿En qué puedo ayudarte?";

/// Embed the knowledge document in the fixed instructional template.
pub fn system_context(knowledge: &str) -> String {
    format!(
        "Eres un asistente virtual especializado en responder sobre el portafolio de un desarrollador.\n\
         \n\
         INFORMACIÓN DEL DESARROLLADOR:\n\
         {}\n\
         \n\
         INSTRUCCIONES:\n\
         - Responde de manera amigable y profesional\n\
         - Usa solo la información proporcionada\n\
         - Sé conciso pero informativo\n\
         - Responde en español\n\
         - Si no sabes algo, sugiere contactar directamente",
        knowledge
    )
}

/// Build the ordered turn sequence: system context, greeting, prior history
/// in client-supplied order, new message last. History roles are normalized:
/// anything that is not "user" becomes "model".
pub fn build_contents(knowledge: &str, history: &[HistoryEntry], message: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(Content::user(system_context(knowledge)));
    contents.push(Content::model(GREETING));

    for entry in history {
        contents.push(match entry.role.as_str() {
            "user" => Content::user(entry.content.clone()),
            _ => Content::model(entry.content.clone()),
        });
    }

    contents.push(Content::user(message));
    contents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(role: &str, content: &str) -> HistoryEntry {
        HistoryEntry {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_system_context_embeds_knowledge() {
        let context = system_context("HABILIDADES: Rust");
        assert!(context.contains("HABILIDADES: Rust"));
        assert!(context.contains("Responde en español"));
    }

    #[test]
    fn test_empty_history_yields_three_turns() {
        let contents = build_contents("doc", &[], "hola");
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[1].parts[0].text, GREETING);
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "hola");
    }

    #[test]
    fn test_history_order_preserved_and_roles_normalized() {
        let history = vec![
            entry("user", "primera"),
            entry("assistant", "segunda"),
            entry("model", "tercera"),
        ];
        let contents = build_contents("doc", &history, "cuarta");

        assert_eq!(contents.len(), 6);
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "primera");
        assert_eq!(contents[3].role, "model");
        assert_eq!(contents[4].role, "model");
        assert_eq!(contents[5].parts[0].text, "cuarta");
    }
}

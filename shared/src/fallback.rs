//! Canned replies used when the model invocation fails.

/// Keyword-matched Spanish reply for the degraded path. Topics: skills,
/// projects, contact; anything else gets the generic offer.
pub fn fallback_reply(message: &str) -> String {
    let message = message.to_lowercase();
    let mut reply = String::from("¡Hola! Soy el asistente virtual. ");

    if message.contains("habilidad") || message.contains("tecnolog") {
        reply.push_str("Tengo experiencia en React, TypeScript, Node.js, Python, PostgreSQL y MongoDB.");
    } else if message.contains("proyecto") {
        reply.push_str("He trabajado en proyectos de e-commerce, dashboards analytics y aplicaciones móviles.");
    } else if message.contains("contact") {
        reply.push_str("Puedes contactarme a través del formulario en mi portafolio o por email.");
    } else {
        reply.push_str("Puedo contarte sobre mis habilidades técnicas, proyectos realizados y experiencia. ¿Qué te gustaría saber?");
    }

    reply
}

/// Best-effort extraction of `message` from a body that failed strict
/// parsing, so the keyword match still sees the user's text when possible.
pub fn lenient_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_default()
}

//! Compatibility shim for bookings whose client contact was written into
//! the free-text notes before the structured contact columns existed.
//!
//! Two shapes are in the wild:
//! - client booking flow: `... Client: Name | Tel: 06.. | Email: a@b | free text`
//! - manual entry: `Client: Name. free text`
//!
//! New bookings never produce either; the shim only reads.

use crate::models::ClientContact;

const CLIENT_PREFIX: &str = "Client:";
const FIELD_SEPARATOR: &str = " | ";

/// Extract the contact embedded in legacy notes, if any.
pub fn parse_client_contact(notes: &str) -> Option<ClientContact> {
    let start = notes.find(CLIENT_PREFIX)?;
    let rest = &notes[start + CLIENT_PREFIX.len()..];

    if rest.contains(FIELD_SEPARATOR) {
        parse_piped(rest)
    } else {
        parse_manual(rest)
    }
}

fn parse_piped(rest: &str) -> Option<ClientContact> {
    let mut parts = rest.split(FIELD_SEPARATOR);
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }

    let mut contact = ClientContact {
        name: name.to_string(),
        phone: None,
        email: None,
    };
    for part in parts {
        let part = part.trim();
        if let Some(phone) = part.strip_prefix("Tel:") {
            contact.phone = meaningful(phone);
        } else if let Some(email) = part.strip_prefix("Email:") {
            contact.email = meaningful(email);
        }
    }
    Some(contact)
}

fn parse_manual(rest: &str) -> Option<ClientContact> {
    let name = match rest.find(". ") {
        Some(end) => &rest[..end],
        None => rest.trim_end_matches('.'),
    }
    .trim();
    if name.is_empty() {
        return None;
    }
    Some(ClientContact {
        name: name.to_string(),
        phone: None,
        email: None,
    })
}

/// "-" and blanks were used as placeholders.
fn meaningful(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booking_flow_notes() {
        let notes = "Estimation: 120–180€. Client: Jeanne Petit | Tel: 0612345678 | Email: jeanne@example.fr | Porte d'entrée bloquée";
        let contact = parse_client_contact(notes).unwrap();
        assert_eq!(contact.name, "Jeanne Petit");
        assert_eq!(contact.phone.as_deref(), Some("0612345678"));
        assert_eq!(contact.email.as_deref(), Some("jeanne@example.fr"));
    }

    #[test]
    fn dash_placeholder_means_absent() {
        let contact = parse_client_contact("Client: Marc | Tel: - | Email: - | ").unwrap();
        assert_eq!(contact.phone, None);
        assert_eq!(contact.email, None);
    }

    #[test]
    fn parses_manual_entry_notes() {
        let contact = parse_client_contact("Client: Marie Bernard. Code portail 4512").unwrap();
        assert_eq!(contact.name, "Marie Bernard");
    }

    #[test]
    fn manual_entry_without_trailing_text() {
        let contact = parse_client_contact("Client: Sophie Laurent.").unwrap();
        assert_eq!(contact.name, "Sophie Laurent");
    }

    #[test]
    fn notes_without_prefix_yield_nothing() {
        assert!(parse_client_contact("Prévoir escabeau").is_none());
        assert!(parse_client_contact("Client:   ").is_none());
    }
}

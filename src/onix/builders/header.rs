use chrono::NaiveDateTime;

use super::{Context, conform, put, put_opt};
use crate::onix::order::{HEADER, SENDER};
use crate::onix::publisher::PublisherOverride;
use crate::onix::tree::Element;
use crate::onix::version::OnixRelease;

/// Sender name when neither the caller nor the record names one.
pub const DEFAULT_SENDER_NAME: &str = "ONIX Provider";

/// `SentDateTime` format.
const SENT_DATE_TIME: &str = "%Y%m%dT%H%M%S";

pub fn remediation_note(release: OnixRelease) -> String {
    format!(
        "This file was remediated to include accessibility information. Original ONIX version: {release}"
    )
}

/// Resolve the message sender.
///
/// Override first, then the legacy `Sender/SenderName` or `FromCompany`,
/// then the first `RecordSourceName` in the message.
pub fn sender_name(message: &Element, publisher: Option<&PublisherOverride>) -> String {
    let header = message.child("Header");
    publisher
        .and_then(|p| p.sender_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| {
            header
                .and_then(|h| h.child("Sender"))
                .and_then(|s| s.child_text("SenderName"))
        })
        .or_else(|| header.and_then(|h| h.child_text("FromCompany")))
        .or_else(|| {
            message
                .find_all("RecordSourceName")
                .into_iter()
                .map(Element::text)
                .find(|name| !name.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string())
}

fn build_sender(ctx: &Context) -> Element {
    let legacy = ctx.header;
    let legacy_sender = legacy.and_then(|h| h.child("Sender"));
    let mut sender = Element::new("Sender");

    if let Some(ids) = legacy_sender.map(|s| s.children_named("SenderIdentifier")) {
        for id in ids {
            SENDER.insert(&mut sender, conform(id));
        }
    }
    // 2.1 carries the sender's GLN or SAN as plain fields
    for (field, id_type) in [("FromEANNumber", "06"), ("FromSAN", "07")] {
        if let Some(value) = legacy.and_then(|h| h.child_text(field)) {
            let id = Element::new("SenderIdentifier")
                .with_child(Element::leaf("SenderIDType", id_type))
                .with_child(Element::leaf("IDValue", value));
            SENDER.insert(&mut sender, id);
        }
    }

    put(&SENDER, &mut sender, "SenderName", ctx.sender_name);

    let contact = ctx
        .overriding(|p| p.contact_name.as_ref())
        .or_else(|| legacy_sender.and_then(|s| s.child_text("ContactName")))
        .or_else(|| legacy.and_then(|h| h.child_text("FromPerson")));
    put_opt(&SENDER, &mut sender, "ContactName", contact);

    let email = ctx
        .overriding(|p| p.email.as_ref())
        .or_else(|| legacy_sender.and_then(|s| s.child_text("EmailAddress")))
        .or_else(|| legacy.and_then(|h| h.child_text("FromEmail")));
    put_opt(&SENDER, &mut sender, "EmailAddress", email);

    sender
}

/// Build the message `Header`.
pub fn build_header(ctx: &Context, release: OnixRelease, sent_at: NaiveDateTime) -> Element {
    let legacy = ctx.header;
    let mut header = Element::new("Header");

    HEADER.insert(&mut header, build_sender(ctx));

    if let Some(addressees) = legacy.map(|h| h.children_named("Addressee")) {
        for addressee in addressees {
            HEADER.insert(&mut header, conform(addressee));
        }
    }
    if let Some(to) = legacy.and_then(|h| h.child_text("ToCompany")) {
        let addressee = Element::new("Addressee").with_child(Element::leaf("AddresseeName", to));
        HEADER.insert(&mut header, addressee);
    }

    put(&HEADER, &mut header, "SentDateTime", sent_at.format(SENT_DATE_TIME).to_string());
    put(&HEADER, &mut header, "MessageNote", remediation_note(release));
    put_opt(&HEADER, &mut header, "DefaultLanguageOfText", ctx.default_language());
    put_opt(&HEADER, &mut header, "DefaultPriceType", ctx.default_price_type());
    put_opt(&HEADER, &mut header, "DefaultCurrencyCode", ctx.default_currency());

    header
}

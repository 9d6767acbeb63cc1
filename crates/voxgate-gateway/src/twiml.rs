//! Telephony markup (TwiML) responses.
//!
//! A [`VoiceResponse`] is an ordered list of verbs rendered into the XML
//! document the telephony provider executes top to bottom.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Speech-recognition window settings for a `<Gather>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gather {
    /// Callback that receives the recognized speech.
    pub action: String,
    /// Recognition language, e.g. `en-US`.
    pub language: String,
    /// End-of-speech detection; `auto` lets the provider decide.
    pub speech_timeout: String,
}

/// Call transfer settings for a `<Dial>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dial {
    /// Number to connect the caller to.
    pub number: String,
    /// Callback that receives the transfer outcome.
    pub action: String,
    /// Seconds to ring before giving up.
    pub timeout_secs: u32,
}

/// A single TwiML verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Speak text with the provider's own text-to-speech.
    Say(String),
    /// Play audio fetched from a URL.
    Play(String),
    /// Continue the call at another webhook.
    Redirect(String),
    /// Listen for caller speech.
    Gather(Gather),
    /// Transfer the caller.
    Dial(Dial),
}

/// An ordered TwiML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    /// An empty response. The provider ends its current step with no action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `<Say>`.
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    /// Append a `<Play>`.
    pub fn play(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Play(url.into()));
        self
    }

    /// Append a `<Redirect>`.
    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect(url.into()));
        self
    }

    /// Append a `<Gather input="speech">`.
    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    /// Append a `<Dial>`.
    pub fn dial(mut self, dial: Dial) -> Self {
        self.verbs.push(Verb::Dial(dial));
        self
    }

    /// Verbs in execution order.
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Whether the response hands control to another webhook.
    pub fn redirects_to(&self, target: &str) -> bool {
        self.verbs
            .iter()
            .any(|v| matches!(v, Verb::Redirect(url) if url == target))
    }

    /// Render the XML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &self.verbs {
            match verb {
                Verb::Say(text) => {
                    xml.push_str(&format!("<Say>{}</Say>", escape(text)));
                }
                Verb::Play(url) => {
                    xml.push_str(&format!("<Play>{}</Play>", escape(url)));
                }
                Verb::Redirect(url) => {
                    xml.push_str(&format!(
                        r#"<Redirect method="POST">{}</Redirect>"#,
                        escape(url)
                    ));
                }
                Verb::Gather(g) => {
                    xml.push_str(&format!(
                        r#"<Gather input="speech" action="{}" method="POST" speechTimeout="{}" language="{}"/>"#,
                        escape(&g.action),
                        escape(&g.speech_timeout),
                        escape(&g.language)
                    ));
                }
                Verb::Dial(d) => {
                    xml.push_str(&format!(
                        r#"<Dial action="{}" method="POST" timeout="{}">{}</Dial>"#,
                        escape(&d.action),
                        d.timeout_secs,
                        escape(&d.number)
                    ));
                }
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, "text/xml")], self.to_xml()).into_response()
    }
}

/// Escape text for use in XML element content and attribute values.
///
/// Characters XML 1.0 cannot carry at all (C0 controls other than tab, line
/// feed and carriage return, and the U+FFFE/U+FFFF noncharacters) are dropped.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_ascii_control() && c != '\u{7f}' => {}
            '\u{fffe}' | '\u{ffff}' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response() {
        assert_eq!(
            VoiceResponse::new().to_xml(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#
        );
    }

    #[test]
    fn test_say_then_redirect() {
        let xml = VoiceResponse::new()
            .say("Hello")
            .redirect("/gather")
            .to_xml();
        assert!(xml.contains("<Say>Hello</Say><Redirect method=\"POST\">/gather</Redirect>"));
    }

    #[test]
    fn test_gather_attributes() {
        let xml = VoiceResponse::new()
            .gather(Gather {
                action: "/process_speech".into(),
                language: "en-US".into(),
                speech_timeout: "auto".into(),
            })
            .to_xml();
        assert!(xml.contains(r#"<Gather input="speech" action="/process_speech""#));
        assert!(xml.contains(r#"speechTimeout="auto""#));
        assert!(xml.contains(r#"language="en-US""#));
    }

    #[test]
    fn test_dial_attributes() {
        let xml = VoiceResponse::new()
            .dial(Dial {
                number: "+15185550100".into(),
                action: "/handle_transfer_result".into(),
                timeout_secs: 20,
            })
            .to_xml();
        assert!(xml.contains(
            r#"<Dial action="/handle_transfer_result" method="POST" timeout="20">+15185550100</Dial>"#
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = VoiceResponse::new()
            .say("Tom & Jerry <3 \"puja\"")
            .to_xml();
        assert!(xml.contains("<Say>Tom &amp; Jerry &lt;3 &quot;puja&quot;</Say>"));
    }

    #[test]
    fn test_illegal_xml_chars_are_dropped() {
        let xml = VoiceResponse::new()
            .say("Aarti\u{0}\u{8} at\tseven\u{1b}\u{ffff}\n")
            .to_xml();
        assert!(xml.contains("<Say>Aarti at\tseven\n</Say>"));
        assert_eq!(escape("\u{7f}ok"), "\u{7f}ok");
    }

    #[test]
    fn test_redirects_to() {
        let resp = VoiceResponse::new().say("x").redirect("/gather");
        assert!(resp.redirects_to("/gather"));
        assert!(!VoiceResponse::new().say("x").redirects_to("/gather"));
    }
}

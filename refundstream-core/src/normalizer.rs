use crate::error::{CoreResult, ExplainError};
use crate::model::ExplainRequest;
use unicode_normalization::UnicodeNormalization;

fn clean_text(s: &str) -> String {
    // Unicode NFC normalization + BOM strip + CRLF -> LF + trim
    let mut t = s.nfc().collect::<String>();
    if t.starts_with('\u{FEFF}') {
        t.remove(0);
    }
    if t.contains("\r\n") {
        t = t.replace("\r\n", "\n");
    }
    t.trim().to_string()
}

/// Cleans an explain request before it goes on the wire. An empty question is
/// replaced by `default_question`; an empty return id is rejected.
pub fn normalize_explain(mut req: ExplainRequest, default_question: &str) -> CoreResult<ExplainRequest> {
    req.return_id = clean_text(&req.return_id);
    if req.return_id.is_empty() {
        return Err(ExplainError::Validation("return_id must not be empty".into()));
    }
    req.question = clean_text(&req.question);
    if req.question.is_empty() {
        req.question = clean_text(default_question);
    }
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_QUESTION;

    #[test]
    fn trims_fields_and_keeps_flag() {
        let req = ExplainRequest::new("  ret-1 ", "  Where is it?  ", true);
        let out = normalize_explain(req, DEFAULT_QUESTION).unwrap();
        assert_eq!(out.return_id, "ret-1");
        assert_eq!(out.question, "Where is it?");
        assert!(out.use_backend);
    }

    #[test]
    fn empty_question_uses_default() {
        let req = ExplainRequest::new("ret-1", "   ", false);
        let out = normalize_explain(req, DEFAULT_QUESTION).unwrap();
        assert_eq!(out.question, "Why is my refund delayed?");
    }

    #[test]
    fn empty_return_id_is_validation_error() {
        let req = ExplainRequest::new("\u{FEFF}   ", "q", false);
        let err = normalize_explain(req, DEFAULT_QUESTION).unwrap_err();
        match err {
            ExplainError::Validation(msg) => assert!(msg.contains("return_id")),
            other => panic!("expected Validation, got: {:?}", other),
        }
    }

    #[test]
    fn unicode_nfc_bom_and_crlf_normalization() {
        let req = ExplainRequest::new("\u{FEFF}ret-e\u{301}", "line1\r\nline2", false);
        let out = normalize_explain(req, DEFAULT_QUESTION).unwrap();
        assert_eq!(out.return_id, "ret-é");
        assert_eq!(out.question, "line1\nline2");
    }
}

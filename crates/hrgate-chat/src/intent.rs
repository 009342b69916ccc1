//! Keyword-based intent classification.
//!
//! A best-effort substring classifier, not a parser: the trigger tables are
//! deliberately broad (including common misspellings) and false positives are
//! accepted. PDF checks win when a PDF-specific verb is present.

/// What a typed message is asking the assistant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    DocumentRequest,
    PdfSummary,
    GeneralQuery,
}

/// Verbs that disambiguate toward the PDF flow before anything else runs
const PDF_SPECIFIC_VERBS: &[&str] = &[
    "summarize", "summarise", "upload", "process", "analyze", "analyse", "read", "extract",
];

const PDF_TRIGGERS: &[&str] = &[
    "pdf", "pdfs", "file", "files",
    "summarize", "summarise", "summary", "summaries", "summarization", "summarisation",
    "summariz", "summaris", "summry", "summri", "brief", "briefing",
    "upload", "uplod", "process", "proces", "analyze", "analyse", "analyz",
    "read", "reed", "extract", "convert", "convrt",
    "upload pdf", "process pdf", "analyze pdf", "read pdf", "extract from pdf",
    "summarize pdf", "pdf summary", "pdf analysis", "pdf processing",
    "upload my pdf", "process my pdf", "read my file",
    "can you read", "help me understand", "what is in this",
    "how to upload", "where to upload", "can i upload", "is it possible to upload",
    "what does this say", "what is this about", "tell me about this", "summarize this",
];

const DOCUMENT_TRIGGERS: &[&str] = &[
    "i need", "i want", "i require", "i looking for", "i searching for",
    "need", "want", "require", "looking for", "searching for", "asking for",
    "document", "documents", "doc", "docs", "paper", "papers",
    "certificate", "certificates", "cert", "certs", "letter", "letters",
    "form", "forms", "slip", "slips", "statement", "statements",
    "documant", "documnt", "certificat", "certifcat", "letr", "ltr",
    "dokument", "dokumnt", "sertifikat", "sertifcat",
    "get", "give", "make", "create", "generate", "produce", "issue",
    "provide", "send", "download", "print", "copy", "duplicate",
    "experience", "experiance", "employment", "employmnt", "salary", "salry",
    "bonafide", "bonafid", "bonafied", "noc", "relieving",
    "offer", "offr", "appointment", "appointmnt", "promotion", "promotn",
    "verification", "verificatn", "medical", "medicl", "insurance", "insuranc",
    "travel", "travl", "visa", "business", "busines", "id card", "idcard",
    "pf", "pf statement", "uan", "tax", "form 16", "form16",
    "help me get", "can you give", "please provide", "i would like",
    "i need help", "can you help", "please help", "help me",
    "show me", "tell me", "give me", "send me", "make for me",
    "gimme", "wanna", "gonna", "lemme", "pls", "plz", "thx", "thanks",
    "how to get", "where to get", "when can i get", "what do i need",
    "can i have", "may i have", "is it possible to get",
    "kindly", "please arrange", "please issue", "please make",
    "need urgently", "want immediately", "require asap", "need fast",
];

/// Fallback keyword sets for messages missing the verb phrasing above
const FUZZY_PDF_KEYWORDS: &[&str] = &[
    "pdf", "summarize", "summarise", "upload", "process", "analyze", "analyse",
];

const FUZZY_DOCUMENT_KEYWORDS: &[&str] = &[
    "certificate", "letter", "form", "slip", "statement", "bonafide", "noc",
    "relieving", "offer", "appointment", "promotion",
];

fn any_match(haystack: &str, triggers: &[&str]) -> bool {
    triggers.iter().any(|t| haystack.contains(t))
}

/// Classify a typed message into one of the three chat behaviors
pub fn classify(message: &str) -> Intent {
    let message = message.trim().to_lowercase();

    if any_match(&message, PDF_SPECIFIC_VERBS) && any_match(&message, PDF_TRIGGERS) {
        return Intent::PdfSummary;
    }
    if any_match(&message, DOCUMENT_TRIGGERS) {
        return Intent::DocumentRequest;
    }
    if any_match(&message, FUZZY_PDF_KEYWORDS) {
        return Intent::PdfSummary;
    }
    if any_match(&message, FUZZY_DOCUMENT_KEYWORDS) {
        return Intent::DocumentRequest;
    }
    Intent::GeneralQuery
}

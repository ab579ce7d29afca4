// Maps free-form CSV headers onto the fields of a billing row.

/// Churn assumed for rows whose churn cell is blank or unparseable.
pub const DEFAULT_MONTHLY_CHURN: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderField {
    CustomerId,
    CustomerName,
    CurrentPrice,
    MonthlyChurn,
    ContractStartDate,
    Seats,
    Usage,
    Other(String),
}

impl HeaderField {
    pub fn is_required(&self) -> bool {
        matches!(self, HeaderField::CustomerId | HeaderField::CurrentPrice)
    }
}

pub fn normalize_all(headers: &[String]) -> Vec<HeaderField> {
    headers.iter().map(|h| classify_header(h)).collect()
}

/// Lowercases, drops punctuation and whitespace, and strips a leading
/// `customer`/`client` qualifier: `"Customer ID"` becomes `"id"`.
pub fn normalize_header(header: &str) -> String {
    let flat: String = header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    for prefix in ["customer", "client"] {
        if let Some(rest) = flat.strip_prefix(prefix) {
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    flat
}

pub fn classify_header(header: &str) -> HeaderField {
    let normalized = normalize_header(header);
    match normalized.as_str() {
        "id" | "identifier" => HeaderField::CustomerId,
        "name" | "title" => HeaderField::CustomerName,
        "price" | "amount" | "cost" | "currentprice" => HeaderField::CurrentPrice,
        "churn" | "attrition" | "monthlychurn" => HeaderField::MonthlyChurn,
        "date" | "start" | "startdate" | "contractstartdate" => HeaderField::ContractStartDate,
        "seat" | "seats" | "user" | "users" | "member" | "members" => HeaderField::Seats,
        "usage" | "consumption" | "volume" => HeaderField::Usage,
        _ => HeaderField::Other(normalized),
    }
}

pub mod email;

/// Event emitted when a lead-capture form is accepted.
#[derive(Debug, Clone)]
pub struct LeadEvent {
    pub brand: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub contact_id: String,
    pub ts: chrono::DateTime<chrono::Utc>,
}

/// All server-side primary keys are integer identities.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (birth dates, eligibility dates) carry no time zone.
pub type Date = chrono::NaiveDate;

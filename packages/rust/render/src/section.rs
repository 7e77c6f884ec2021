//! Report sections and their rows.

use gatewayreport_shared::{CategoryLabel, EventDimension, EventRecord};

/// The four tables of the report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    TopBlockedDomains,
    TopAllowedDomains,
    TopCategoriesAllowed,
    TopCategoriesBlocked,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::TopBlockedDomains => "Top Blocked Domains",
            Self::TopAllowedDomains => "Top Allowed Domains",
            Self::TopCategoriesAllowed => "Top Categories Allowed",
            Self::TopCategoriesBlocked => "Top Categories Blocked",
        }
    }

    /// Column headers for the section's table.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::TopBlockedDomains | Self::TopAllowedDomains => &["Domain", "Count"],
            Self::TopCategoriesAllowed | Self::TopCategoriesBlocked => {
                &["Count", "Category", "Description"]
            }
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRow {
    Domain { name: String, count: u64 },
    Category { count: u64, label: CategoryLabel },
}

impl ReportRow {
    pub fn domain(name: impl Into<String>, count: u64) -> Self {
        Self::Domain {
            name: name.into(),
            count,
        }
    }

    pub fn category(count: u64, label: CategoryLabel) -> Self {
        Self::Category { count, label }
    }

    /// Join an event record with category metadata. Domain records pass
    /// through; category records always get a label from `lookup`.
    pub fn from_record(record: &EventRecord, lookup: impl Fn(u32) -> CategoryLabel) -> Self {
        match &record.dimension {
            EventDimension::Domain(name) => Self::domain(name.clone(), record.count),
            EventDimension::Category(id) => Self::category(record.count, lookup(*id)),
        }
    }

    /// Cell text in column order, unescaped.
    pub fn cells(&self) -> Vec<String> {
        match self {
            Self::Domain { name, count } => vec![name.clone(), count.to_string()],
            Self::Category { count, label } => vec![
                count.to_string(),
                label.name.clone(),
                label.description.clone(),
            ],
        }
    }
}

/// One table of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    /// Build a section from records, keeping their order.
    pub fn from_records(
        kind: SectionKind,
        records: &[EventRecord],
        lookup: impl Fn(u32) -> CategoryLabel,
    ) -> Self {
        Self {
            kind,
            rows: records
                .iter()
                .map(|record| ReportRow::from_record(record, &lookup))
                .collect(),
        }
    }
}

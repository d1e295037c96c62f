/// Fixed phrases and defaults of the yearly case-list document.

// Both phrases appear only in the blank "open a new case" form at the end of the document.
pub const TEMPLATE_CASE_TYPE_MARKER: &str = "Vrsta zadeve";
pub const TEMPLATE_SUBJECT_MARKER: &str = "Subjekt zadeve:";

/// Annotation ("is resolving") that data entry sometimes appends after a supervisor name.
pub const RESOLVING_MARKER: &str = "rešuje";

/// `dd.MM.yy`
pub const DATE_FORMAT: &str = "%d.%m.%y";

pub const DEFAULT_INCLUDE_LAST_N_YEARS: i64 = 3;
pub const MIN_INCLUDE_LAST_N_YEARS: i64 = 1;
pub const MAX_INCLUDE_LAST_N_YEARS: i64 = 10;

pub const DEFAULT_LOW_CASELOAD_THRESHOLD: usize = 5;

/// Number of cells in a well-formed case row:
/// `#`, reporter, subject - description, supervisor - caseload, assigned date.
pub const CASE_ROW_CELLS: usize = 5;

pub const REPORTER_CELL: usize = 1;
pub const SUBJECT_CELL: usize = 2;
pub const SUPERVISOR_CELL: usize = 3;
pub const DATE_CELL: usize = 4;

/// Strict subject/description separators, tried in order.
pub const SUBJECT_SEPARATORS: &[&str] = &[" - ", " – "];

/// Loose subject/description separator: any hyphen or en-dash with optional surrounding whitespace.
pub const LOOSE_SUBJECT_SEPARATOR: &str = r"\s*[-–]\s*";

/// Supervisor/caseload separator.
pub const SUPERVISOR_SEPARATOR: &str = r"\s*-\s*";

/// Known misspellings of supervisor names and their canonical spelling.
pub const DEFAULT_SUPERVISOR_TYPOS: &[(&str, &str)] = &[
    ("Monika Benkovč", "Monika Benkovič"),
    ("Klenem Mišič", "Klemen Mišič"),
    ("Marko Logar", "Jure Logar"),
    ("Marijan Činč", "Marijan Čonč"),
    ("Tana Slak", "Tanja Slak"),
    ("Blaš Pavšič", "Blaž Pavšič"),
];

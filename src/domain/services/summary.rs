use crate::domain::{format_number, FinancialSnapshot};

/// Renders the fixed one-line summary of a snapshot. Never fails: missing
/// sector or ratio print `N/A`, a missing interest share prints `0`.
///
/// The summary is also used verbatim as the retrieval query.
pub fn format_summary(snapshot: &FinancialSnapshot) -> String {
    let sector = snapshot.sector().unwrap_or("N/A");
    let interest = snapshot
        .interest_pct()
        .map(format_number)
        .unwrap_or_else(|| "0".to_string());
    let debt = snapshot
        .debt_ratio()
        .map(format_number)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Sector: {}. Interest income represents {}% of revenue. Debt-to-equity ratio is {}.",
        sector, interest, debt
    )
}

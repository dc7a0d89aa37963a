use crate::client::poller::TransactionView;
use crate::utils::{explorer_url, format_algo, format_date, short_address, Table};

/// Transaction history as a terminal table
pub fn render_view(view: &TransactionView) -> String {
    if view.transactions().is_empty() {
        return "No transactions yet. Send your first transaction to see it appear here."
            .to_string();
    }

    let mut table = Table::new(&["Tx ID", "From", "To", "Amount", "Status", "Round", "Date"]);
    for tx in view.transactions() {
        table.add_row(vec![
            short_address(&tx.tx_id),
            short_address(&tx.from),
            short_address(&tx.to),
            format_algo(tx.amount),
            tx.status.to_string(),
            tx.confirmed_round.map(|r| r.to_string()).unwrap_or_default(),
            format_date(&tx.created_at),
        ]);
    }
    let mut output = table.render();
    for tx in view.pending() {
        output.push_str(&format!(
            "\nPending {}: {}",
            short_address(&tx.tx_id),
            explorer_url(&tx.tx_id)
        ));
    }
    output
}

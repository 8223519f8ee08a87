/// Format a price in Kenyan shillings with thousands separators,
/// e.g. `3091.5` becomes `"KSh 3,091.50"`.
pub fn format_price(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}KSh {}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        frac
    )
}

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use day_ahead::{
    PriceQuote,
    QuotePair,
    quantity::ConsumerPrice,
    statistics::{DayStatistics, HourlyAggregate},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn price_cell(price: Option<ConsumerPrice>, average: Option<ConsumerPrice>) -> Cell {
    let Some(price) = price else {
        return Cell::new("n/a").add_attribute(Attribute::Dim);
    };
    let cell = Cell::new(format!("{price:.2}")).set_alignment(CellAlignment::Right);
    match average {
        Some(average) if price > average => cell.fg(Color::Red),
        Some(_) => cell.fg(Color::Green),
        None => cell,
    }
}

pub fn build_quote_table(pair: &QuotePair) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Interval", "Wholesale", "Consumer", "Hour average"]);
    for quote in std::iter::once(&pair.today).chain(&pair.tomorrow) {
        add_quote_row(&mut table, quote);
    }
    table
}

fn add_quote_row(table: &mut Table, quote: &PriceQuote) {
    table.add_row(vec![
        Cell::new(quote.date.format("%a %b %d")).add_attribute(Attribute::Dim),
        Cell::new(format!("{} ({})", quote.interval, quote.interval.start_time().format("%H:%M"))),
        quote.wholesale.map_or_else(
            || Cell::new("n/a").add_attribute(Attribute::Dim),
            |price| Cell::new(price).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
        ),
        price_cell(quote.consumer, Some(quote.hour.average)),
        price_cell(Some(quote.hour.average), None),
    ]);
}

pub fn build_hours_table(hours: &[HourlyAggregate], statistics: Option<&DayStatistics>) -> Table {
    let day_average = statistics.map(|statistics| statistics.average);
    let mut table = new_table();
    table.set_header(vec!["Hour", "Q1", "Q2", "Q3", "Q4", "Average"]);
    for hour in hours {
        let mut row = vec![Cell::new(format!("{:02}", hour.hour))];
        row.extend((1..=4).map(|quarter| price_cell(hour.quarters.get(&quarter).copied(), day_average)));
        row.push(price_cell(Some(hour.average), day_average).add_attribute(Attribute::Bold));
        table.add_row(row);
    }
    table
}

pub fn build_statistics_table(statistics: &DayStatistics) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Min", "Max", "Average", "Intervals", "Hours"]);
    table.add_row(vec![
        Cell::new(statistics.date.format("%a %b %d")),
        Cell::new(format!("{:.2} at {:02}", statistics.min.price, statistics.min.hour)).fg(Color::Green),
        Cell::new(format!("{:.2} at {:02}", statistics.max.price, statistics.max.hour)).fg(Color::Red),
        Cell::new(format!("{:.2}", statistics.average)),
        Cell::new(statistics.n_intervals).set_alignment(CellAlignment::Right),
        Cell::new(statistics.n_hours).set_alignment(CellAlignment::Right),
    ]);
    table
}

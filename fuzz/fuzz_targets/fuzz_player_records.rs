#![no_main]

use libfuzzer_sys::fuzz_target;
use lobby_board::{PlayerRecord, RawPlayerRecord, StatisticsTable, StatsControl};

fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<RawPlayerRecord>>(data) else {
        return;
    };
    let _: Vec<PlayerRecord> = records.iter().cloned().map(PlayerRecord::from).collect();

    // Every control must keep the table consistent for any roster.
    let mut table = StatisticsTable::new();
    let ticket = table.begin_fetch();
    table.complete_fetch(ticket, Ok(records));
    for id in ["filter-top-10", "sort-down-by-rank", "next-page", "sort-up-by-name", "previous-page"] {
        if let Ok(control) = id.parse::<StatsControl>() {
            table.click(control);
            let _ = table.rows();
        }
    }
});

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::kv::SqliteKvStore;
use crate::store::queue::PunchQueue;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Queue { list, clear } = cmd {
        let mut queue = PunchQueue::load(Box::new(SqliteKvStore::open(&cfg.queue_database)?))?;

        if *list || !*clear {
            print_queue(&queue);
        }

        if *clear {
            let dropped = queue.clear()?;
            success(format!("Discarded {} queued punch(es).", dropped));
        }
    }

    Ok(())
}

fn print_queue(queue: &PunchQueue) {
    let entries = queue.drain();
    if entries.is_empty() {
        info("Queue is empty.");
        return;
    }

    let mut table = Table::new(vec![
        Column::new("WORKER", 16),
        Column::new("PUNCH", 9),
        Column::new("CAPTURED AT", 26),
        Column::new("TZ", 18),
        Column::new("LOCATION", 22),
    ]);

    for e in &entries {
        table.add_row(vec![
            e.worker_id.clone(),
            e.kind.label().to_string(),
            e.captured_at.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
            e.time_zone.clone(),
            e.location.map(|l| l.to_db_str()).unwrap_or_else(|| "--".into()),
        ]);
    }

    println!("📥 {} queued punch(es):\n", entries.len());
    print!("{}", table.render());
}

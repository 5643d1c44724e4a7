use std::io::{self, Write};

use synth_phore::dataset::stats::RunStats;
use synth_phore::io::labels::LabelMap;
use synth_phore::train::TrainReport;

use super::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_run_summary(stats: &RunStats) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Ligands Read", format!("{}", stats.ligands_read)),
        ("Records Skipped", format!("{}", stats.records_skipped)),
        ("Entries Written", format!("{}", stats.entries_written)),
        ("Discarded", format!("{}", stats.discarded)),
        ("Unusable", format!("{}", stats.unusable)),
    ];

    if let Some(atoms) = &stats.ligand_atoms {
        rows.push(("Ligand Atoms", atoms.to_string()));
    }
    if let Some(sites) = &stats.pharmacophore_sites {
        rows.push(("Pharm Sites", sites.to_string()));
    }

    rows.push(("Workers", format!("{}", stats.workers)));
    rows.push(("Seed", format!("{}", stats.seed)));

    print_kv_table(&mut out, "Generation Summary", &rows);
}

pub fn print_label_distribution(labels: &LabelMap) {
    let total = labels.len();
    if total == 0 {
        return;
    }

    let active = labels.values().filter(|&&label| label == 1).count();
    let rows = [
        ("active".to_string(), active),
        ("inactive".to_string(), total - active),
    ];

    let stderr = io::stderr();
    let mut out = stderr.lock();
    print_distribution_table(&mut out, "Label Distribution", &rows, total);
}

pub fn print_train_summary(report: &TrainReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Epochs", format!("{}", report.epochs_run)),
        ("Train Loss", format!("{:.4}", report.final_train_loss)),
    ];

    if let Some(eval) = &report.final_eval {
        rows.push(("Val Loss", format!("{:.4}", eval.loss)));
        rows.push(("Val Accuracy", format!("{:.1}%", eval.accuracy * 100.0)));
    }
    if let Some(path) = &report.checkpoint {
        rows.push(("Checkpoint", path.display().to_string()));
    }

    print_kv_table(&mut out, "Training Summary", &rows);
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Metric",
        "Value",
        key_w = key_w,
        val_w = val_w
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

fn print_distribution_table(
    out: &mut impl Write,
    title: &str,
    rows: &[(String, usize)],
    total: usize,
) {
    let name_w = 10usize;
    let count_w = 8usize;
    let sep_overhead = 6;
    let share_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + sep_overhead);
    let max_bar_width = share_w.saturating_sub(8).min(20);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{n_line}┬{c_line}┬{s_line}┐",
        INDENT,
        n_line = "─".repeat(name_w + 2),
        c_line = "─".repeat(count_w + 2),
        s_line = "─".repeat(share_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>count_w$} │ {:<share_w$} │",
        INDENT,
        "Label",
        "Count",
        "Share",
        name_w = name_w,
        count_w = count_w,
        share_w = share_w
    );
    let _ = writeln!(
        out,
        "{}├{n_line}┼{c_line}┼{s_line}┤",
        INDENT,
        n_line = "─".repeat(name_w + 2),
        c_line = "─".repeat(count_w + 2),
        s_line = "─".repeat(share_w + 2)
    );

    for (name, count) in rows {
        let pct = (*count as f64 / total as f64) * 100.0;
        let bar = make_bar(pct, max_bar_width);
        let share_cell = format!("{}  {:>5.1}%", bar, pct);
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<share_w$} │",
            INDENT,
            truncate(name, name_w),
            count,
            share_cell,
            name_w = name_w,
            count_w = count_w,
            share_w = share_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{n_line}┴{c_line}┴{s_line}┘",
        INDENT,
        n_line = "─".repeat(name_w + 2),
        c_line = "─".repeat(count_w + 2),
        s_line = "─".repeat(share_w + 2)
    );
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = ((pct / 100.0) * max_width as f64).round() as usize;
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

use scripture_core::search::ActiveCategories;
use scripture_core::{SearchHit, Session};
use std::io::{self, Write};

pub fn write_hits<W: Write>(out: &mut W, hits: &[SearchHit<'_>]) -> io::Result<()> {
    for h in hits {
        let badge = h.category.map(|c| format!("  [{}]", c)).unwrap_or_default();
        writeln!(out, "{}{}  #{}", h.passage.reference, badge, h.passage.id)?;
        writeln!(out, "    {}", h.snippet)?;
    }
    Ok(())
}

pub fn write_more_hint<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    if session.has_more() {
        writeln!(out, "Load More ({} remaining)", session.remaining())?;
    }
    Ok(())
}

pub fn search(
    session: &mut Session,
    query: &str,
    categories: &[String],
    all: bool,
    batches: usize,
    json: bool,
) -> anyhow::Result<()> {
    if !categories.is_empty() {
        if let Some(bad) = categories.iter().find(|c| session.category_name(c).is_none()) {
            anyhow::bail!("unknown category '{}'", bad);
        }
        session.set_active(ActiveCategories::only(categories.iter().cloned()));
    }
    let Some(total) = session.search(query) else {
        anyhow::bail!("query is empty");
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if total == 0 && !json {
        writeln!(out, "No matches found.")?;
        return Ok(());
    }

    let mut items: Vec<serde_json::Value> = Vec::new();
    let mut n = 0usize;
    while session.has_more() && (all || n < batches.max(1)) {
        let hits = session.reveal_next_batch();
        if json {
            for h in &hits {
                items.push(serde_json::to_value(h)?);
            }
        } else {
            write_hits(&mut out, &hits)?;
        }
        n += 1;
    }

    if json {
        let v = serde_json::json!({
            "query": query,
            "total": total,
            "shown": session.revealed(),
            "remaining": session.remaining(),
            "results": items,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&v)?)?;
    } else {
        writeln!(out, "-- {} of {} matches --", session.revealed(), total)?;
        write_more_hint(&mut out, session)?;
    }
    Ok(())
}

pub fn suggest(session: &Session, prefix: &str, json: bool) -> anyhow::Result<()> {
    let words = session.suggest(prefix);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({"prefix": prefix, "count": words.len(), "words": words}))?
        );
    } else {
        for w in words {
            println!("{}", w);
        }
    }
    Ok(())
}

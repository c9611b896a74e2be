use scripture_core::chapter::ChapterView;
use scripture_core::Session;
use std::io::{self, Write};

const VERSE_SEPARATOR: &str = "\n\n";

pub fn write_chapter<W: Write>(out: &mut W, session: &Session, view: &ChapterView, numbered: bool) -> io::Result<()> {
    writeln!(out, "== {} ==", view.chapter_id)?;
    writeln!(out, "{}", view.render(VERSE_SEPARATOR, numbered))?;
    let prev = if session.can_go_back() { "< prev" } else { "" };
    let next = if session.can_go_forward() { "next >" } else { "" };
    writeln!(
        out,
        "-- chapter {} of {} -- {} {}",
        view.position + 1,
        session.chapters().len(),
        prev,
        next
    )?;
    Ok(())
}

pub fn chapter(session: &mut Session, id: &str, delta: isize, numbered: bool, json: bool) -> anyhow::Result<()> {
    let Some(mut view) = session.view_chapter(id) else {
        anyhow::bail!("chapter '{}' not found", id);
    };
    if delta != 0 {
        match session.navigate(delta) {
            Some(v) => view = v,
            None => eprintln!("[scripture] no {} chapter", if delta > 0 { "next" } else { "previous" }),
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        let stdout = io::stdout();
        write_chapter(&mut stdout.lock(), session, &view, numbered)?;
    }
    Ok(())
}

pub fn chapters(session: &Session, filter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let list: Vec<&str> = session
        .chapters()
        .iter()
        .map(|s| s.as_str())
        .filter(|c| filter.map_or(true, |f| c.starts_with(f)))
        .collect();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({"count": list.len(), "chapters": list}))?
        );
    } else {
        for (i, c) in list.iter().enumerate() {
            println!("{}. {}", i + 1, c);
        }
    }
    Ok(())
}

pub fn write_verse<W: Write>(out: &mut W, session: &Session, id: usize) -> io::Result<bool> {
    let Some(p) = session.passage(id) else {
        return Ok(false);
    };
    let badge = p
        .source
        .as_deref()
        .and_then(|s| session.category_name(s))
        .map(|c| format!("  [{}]", c))
        .unwrap_or_default();
    writeln!(out, "{}{}", p.reference, badge)?;
    writeln!(out, "{}", p.text)?;
    writeln!(out, "View Chapter ({})", p.chapter_id)?;
    Ok(true)
}

pub fn verse(session: &Session, id: usize, json: bool) -> anyhow::Result<()> {
    if json {
        let Some(p) = session.passage(id) else {
            anyhow::bail!("no passage with id {}", id);
        };
        println!("{}", serde_json::to_string_pretty(p)?);
        return Ok(());
    }
    let stdout = io::stdout();
    if !write_verse(&mut stdout.lock(), session, id)? {
        anyhow::bail!("no passage with id {}", id);
    }
    Ok(())
}

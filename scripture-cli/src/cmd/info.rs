use scripture_core::Session;

pub fn status(session: &Session, json: bool) -> anyhow::Result<()> {
    let c = session.corpus();
    if json {
        let errors: Vec<_> = session
            .load_errors()
            .iter()
            .map(|(f, e)| serde_json::json!({"file": f, "target": e.target(), "error": e.to_string()}))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "status": session.status().to_string(),
                "passages": c.passages.len(),
                "words": c.vocabulary.len(),
                "chapters": c.chapters.len(),
                "errors": errors,
            }))?
        );
        return Ok(());
    }
    println!("{}", session.status());
    println!("passages: {}", c.passages.len());
    println!("words:    {}", c.vocabulary.len());
    println!("chapters: {}", c.chapters.len());
    for (f, e) in session.load_errors() {
        println!("failed:   {} -> {} ({})", f, e.target().unwrap_or("-"), e);
    }
    Ok(())
}

pub fn categories(session: &Session, json: bool) -> anyhow::Result<()> {
    let rows: Vec<_> = session
        .categories()
        .iter()
        .map(|cat| (cat, session.corpus().count_by_source(&cat.id), session.active().is_active(&cat.id)))
        .collect();
    if json {
        let items: Vec<_> = rows
            .iter()
            .map(|(cat, n, active)| {
                serde_json::json!({"id": cat.id, "name": cat.name, "file": cat.file, "passages": n, "active": active})
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({"count": items.len(), "categories": items}))?);
    } else {
        for (cat, n, _) in rows {
            println!("{:<6} {:<16} {:>6}  {}", cat.id, cat.name, n, cat.file);
        }
    }
    Ok(())
}

pub fn legal(session: &Session, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({"legal": session.legal_text()}))?);
    } else {
        println!("Legal Disclosure");
        println!("{}", session.legal_text());
    }
    Ok(())
}

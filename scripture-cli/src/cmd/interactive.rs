use super::chapter::{write_chapter, write_verse};
use super::search::{write_hits, write_more_hint};
use scripture_core::session::RESEARCH_MIN_QUERY_CHARS;
use scripture_core::Session;
use std::io::{BufRead, Write};

const HELP: &str = "\
<text>          search references and verse text
:more           show the next batch of results
:toggle <id>    enable/disable a category
:suggest <p>    autocomplete words
:open <n>       show passage #n
:chapter <key>  read a chapter, e.g. :chapter Genesis 1 (no key: reshow)
:next / :prev   move between chapters
:legal          legal notice
:quit           leave";

pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, mut out: W) -> anyhow::Result<()> {
    writeln!(out, "{} Type :help for commands.", session.status())?;
    prompt(&mut out)?;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !handle(session, line, &mut out)? {
            break;
        }
        prompt(&mut out)?;
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

/// Executes one input line; returns `false` when the session should end.
fn handle<W: Write>(session: &mut Session, line: &str, out: &mut W) -> anyhow::Result<bool> {
    let (cmd, arg) = match line.strip_prefix(':') {
        Some(rest) => {
            let (c, a) = rest.split_once(' ').unwrap_or((rest, ""));
            (Some(c), a.trim())
        }
        None => (None, line),
    };
    match cmd {
        None => {
            match session.search(arg) {
                Some(0) => writeln!(out, "No matches found.")?,
                Some(total) => {
                    writeln!(out, "{} matches", total)?;
                    show_batch(session, out)?;
                }
                None => {}
            }
        }
        Some("q" | "quit" | "exit") => return Ok(false),
        Some("help") => writeln!(out, "{}", HELP)?,
        Some("more") => {
            if session.has_more() {
                show_batch(session, out)?;
            } else {
                writeln!(out, "No more results.")?;
            }
        }
        Some("toggle") => match session.toggle_category(arg) {
            Some(active) => {
                let name = session.category_name(arg).unwrap_or(arg).to_string();
                writeln!(out, "{} {}", name, if active { "enabled" } else { "disabled" })?;
                if session.query().chars().count() > RESEARCH_MIN_QUERY_CHARS {
                    writeln!(out, "{} matches", session.total_results())?;
                    show_batch(session, out)?;
                }
            }
            None => writeln!(out, "unknown category '{}'", arg)?,
        },
        Some("suggest") => {
            let words = session.suggest(arg);
            writeln!(out, "{}", words.join(" "))?;
        }
        Some("open") => {
            let shown = arg.parse::<usize>().ok().map(|id| write_verse(out, session, id)).transpose()?;
            if shown != Some(true) {
                writeln!(out, "no passage '{}'", arg)?;
            }
        }
        Some("chapter") if arg.is_empty() => match session.current_chapter() {
            Some(v) => write_chapter(out, session, &v, true)?,
            None => writeln!(out, "open a chapter first")?,
        },
        Some("chapter") => match session.view_chapter(arg) {
            Some(v) => write_chapter(out, session, &v, true)?,
            None => writeln!(out, "chapter '{}' not found", arg)?,
        },
        Some("next") | Some("prev") => {
            let delta = if cmd == Some("next") { 1 } else { -1 };
            match session.navigate(delta) {
                Some(v) => write_chapter(out, session, &v, true)?,
                None if session.chapter_position().is_none() => writeln!(out, "open a chapter first")?,
                None => writeln!(out, "no {} chapter", if delta > 0 { "next" } else { "previous" })?,
            }
        }
        Some("legal") => writeln!(out, "{}", session.legal_text())?,
        Some(other) => writeln!(out, "unknown command ':{}' (try :help)", other)?,
    }
    Ok(true)
}

fn show_batch<W: Write>(session: &mut Session, out: &mut W) -> anyhow::Result<()> {
    let hits = session.reveal_next_batch();
    write_hits(out, &hits)?;
    drop(hits);
    write_more_hint(out, session)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scripture_core::config::standard_works;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn session() -> Session {
        let mut text = String::new();
        for v in 1..=60 {
            text.push_str(&format!("Genesis 1:{} And God saw the light, verse {}.\n", v, v));
        }
        text.push_str("Genesis 2:1 Thus the heavens and the earth were finished.\n");
        text.push_str("John 1:5 And the light shineth in darkness.\n");
        let mut files = HashMap::new();
        files.insert("standard_works.txt".to_string(), text);
        let mut s = Session::new(standard_works());
        s.load_files(files).unwrap();
        s
    }

    fn run_script(script: &str) -> String {
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn search_and_more() {
        let out = run_script("light\n:more\n:more\n:quit\n");
        assert!(out.contains("61 matches"));
        assert!(out.contains("Load More (11 remaining)"));
        assert!(out.contains("John 1:5  [New Testament]"));
        assert!(out.contains("No more results."));
        assert!(out.contains("the **light**"));
    }

    #[test]
    fn toggle_reruns_search() {
        let out = run_script("light\n:toggle ot\n:toggle zz\n");
        assert!(out.contains("Old Testament disabled"));
        assert!(out.contains("disabled\n1 matches"));
        assert!(out.contains("unknown category 'zz'"));
    }

    #[test]
    fn chapter_navigation_bounds() {
        let out = run_script(":next\n:chapter Genesis 1\n:prev\n:next\n:next\n:next\n");
        assert!(out.contains("open a chapter first"));
        assert!(out.contains("== Genesis 1 =="));
        assert!(out.contains("no previous chapter"));
        assert!(out.contains("== Genesis 2 =="));
        assert!(out.contains("== John 1 =="));
        assert!(out.contains("no next chapter"));
    }

    #[test]
    fn short_query_not_rerun_on_toggle() {
        let out = run_script("he\n:toggle ot\n");
        assert!(out.contains("Old Testament disabled"));
        assert!(out.ends_with("Old Testament disabled\n> "), "{out}");
    }

    #[test]
    fn bare_chapter_reshows_current() {
        let out = run_script(":chapter\n:chapter Genesis 2\n:chapter\n");
        assert!(out.contains("open a chapter first"));
        assert_eq!(out.matches("== Genesis 2 ==").count(), 2);
    }

    #[test]
    fn metacharacter_query_does_not_fail() {
        let out = run_script("(light\n[\n");
        assert_eq!(out.matches("No matches found.").count(), 2);
    }

    #[test]
    fn open_and_suggest() {
        let out = run_script(":open 60\n:open 999\n:suggest he\n");
        assert!(out.contains("Genesis 2:1  [Old Testament]"));
        assert!(out.contains("View Chapter (Genesis 2)"));
        assert!(out.contains("no passage '999'"));
        assert!(out.contains("heavens"));
    }
}

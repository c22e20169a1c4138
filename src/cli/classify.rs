//! Interactive sorting session.
//!
//! Shows one file at a time. A shortcut key moves it, Backspace undoes the
//! last move, Enter or the right arrow skips, Esc quits.

use console::{style, Key, Term};
use media_tidy::core::organize::{Classifier, ShortcutStore};
use media_tidy::core::scanner::scan_directory;
use media_tidy::error::Result;
use std::path::{Path, PathBuf};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Shortcut(char),
    Undo,
    Skip,
    Quit,
    Ignore,
}

fn action_for(key: &Key) -> Action {
    match key {
        Key::Char(c) if c.is_ascii_alphanumeric() => Action::Shortcut(*c),
        Key::Backspace => Action::Undo,
        Key::Enter | Key::ArrowRight => Action::Skip,
        Key::Escape => Action::Quit,
        _ => Action::Ignore,
    }
}

/// Files still waiting, plus the positions of files moved so far
struct Session {
    files: Vec<PathBuf>,
    position: usize,
    moved: Vec<usize>,
}

impl Session {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            position: 0,
            moved: Vec::new(),
        }
    }

    fn current(&self) -> Option<&Path> {
        self.files.get(self.position).map(PathBuf::as_path)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn record_move(&mut self) {
        self.moved.push(self.position);
        self.advance();
    }

    /// Step back to the file an undo brought back
    fn restore(&mut self, restored: PathBuf) {
        if let Some(index) = self.moved.pop() {
            self.files[index] = restored;
            self.position = index;
        }
    }

    /// An undo that failed still used up the newest move
    fn forget_last(&mut self) {
        self.moved.pop();
    }
}

pub fn run(dir: &Path, store: ShortcutStore) -> Result<()> {
    let term = Term::stdout();
    let classifier = Classifier::new(store);

    let files: Vec<PathBuf> = scan_directory(dir)?
        .into_iter()
        .filter(|f| f.media_type().is_media())
        .map(|f| f.full_path)
        .collect();
    let total = files.len();
    let mut session = Session::new(files);

    print_legend(&term, &classifier)?;

    while let Some(file) = session.current().map(Path::to_path_buf) {
        term.write_line(&format!(
            "[{}/{}] {}",
            style(session.position + 1).cyan(),
            total,
            file.file_name().unwrap_or_default().to_string_lossy()
        ))?;

        match action_for(&term.read_key()?) {
            Action::Shortcut(key) => match classifier.move_by_shortcut(&file, key) {
                Ok(moved) => {
                    term.write_line(&format!("  {} {}", style("→").green(), moved.display()))?;
                    session.record_move();
                }
                Err(e) => term.write_line(&format!("  {} {}", style("✗").red(), e))?,
            },
            Action::Undo => match classifier.undo_last_move() {
                Ok(restored) => {
                    term.write_line(&format!("  {} {}", style("↩").yellow(), restored.display()))?;
                    session.restore(restored);
                }
                Err(e) => {
                    term.write_line(&format!("  {} {}", style("✗").red(), e))?;
                    if !matches!(e, media_tidy::error::UndoError::NothingToUndo) {
                        session.forget_last();
                    }
                }
            },
            Action::Skip => session.advance(),
            Action::Quit => break,
            Action::Ignore => {}
        }
    }

    term.write_line(&format!(
        "{} {} moves can still be undone in this session",
        style("Done.").bold(),
        classifier.undo_count()
    ))?;
    Ok(())
}

fn print_legend(term: &Term, classifier: &Classifier) -> Result<()> {
    for shortcut in classifier.shortcuts() {
        if shortcut.is_configured() {
            term.write_line(&format!(
                "  {} {} ({})",
                style(shortcut.key).bold(),
                shortcut.label,
                shortcut.target_dir
            ))?;
        }
    }
    term.write_line(&format!(
        "  {}",
        style("Backspace: undo  Enter/→: skip  Esc: quit").dim()
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for(&Key::Char('s')), Action::Shortcut('s'));
        assert_eq!(action_for(&Key::Char('?')), Action::Ignore);
        assert_eq!(action_for(&Key::Backspace), Action::Undo);
        assert_eq!(action_for(&Key::ArrowRight), Action::Skip);
        assert_eq!(action_for(&Key::Escape), Action::Quit);
    }

    #[test]
    fn undo_returns_to_the_moved_file() {
        let mut session = Session::new(vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")]);
        session.record_move();
        assert_eq!(session.current(), Some(Path::new("/b.jpg")));

        session.restore(PathBuf::from("/a_1.jpg"));

        assert_eq!(session.current(), Some(Path::new("/a_1.jpg")));
    }

    #[test]
    fn skipping_past_the_end_finishes() {
        let mut session = Session::new(vec![PathBuf::from("/a.jpg")]);
        session.advance();
        assert_eq!(session.current(), None);
    }
}

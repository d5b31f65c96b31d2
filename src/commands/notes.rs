//! Notes service commands.
//!
//! ```bash
//! notepush notes list
//! notepush notes create --author ada --content "Buy milk" --token "ExponentPushToken[...]"
//! notepush notes comment 65f0c0ffee --author bob --content "Done"
//! ```

use anyhow::Result;

use crate::notes::{NewComment, NewNote, Note, NotesClient};
use crate::notifications::PushToken;

/// Prints every note with its comments.
pub async fn list(client: &NotesClient) -> Result<()> {
    let notes = client.list_notes().await?;
    if notes.is_empty() {
        println!("No notes yet");
        return Ok(());
    }
    for note in &notes {
        print!("{}", render_note(note));
    }
    Ok(())
}

/// Creates a note, attaching `token` so the author hears about comments.
pub async fn create(
    client: &NotesClient,
    author: &str,
    content: &str,
    token: Option<&str>,
) -> Result<()> {
    let token = token.map(PushToken::new);
    let draft = NewNote::new(content, author, token.as_ref());
    if client.create_note(&draft).await? {
        println!("Note created");
    } else {
        println!("Nothing to send");
    }
    Ok(())
}

/// Adds a comment to the note with id `note_id`.
pub async fn comment(client: &NotesClient, note_id: &str, author: &str, content: &str) -> Result<()> {
    let draft = NewComment::new(content, author);
    if client.add_comment(note_id, &draft).await? {
        println!("Comment added");
    } else {
        println!("Nothing to send");
    }
    Ok(())
}

fn render_note(note: &Note) -> String {
    let mut out = format!("[{}] {}\n  By: {}\n", note.id, note.content, note.author);
    for comment in &note.comments {
        out.push_str(&format!("    - {} ({})\n", comment.content, comment.author));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Comment;

    #[test]
    fn test_render_note_with_comments() {
        let note = Note {
            id: "n1".to_string(),
            content: "Buy milk".to_string(),
            author: "ada".to_string(),
            comments: vec![Comment {
                id: "c1".to_string(),
                content: "Done".to_string(),
                author: "bob".to_string(),
            }],
        };

        assert_eq!(
            render_note(&note),
            "[n1] Buy milk\n  By: ada\n    - Done (bob)\n"
        );
    }

    #[test]
    fn test_render_note_without_comments() {
        let note = Note {
            id: "n2".to_string(),
            content: "Hi".to_string(),
            author: "eve".to_string(),
            comments: Vec::new(),
        };
        assert_eq!(render_note(&note), "[n2] Hi\n  By: eve\n");
    }
}

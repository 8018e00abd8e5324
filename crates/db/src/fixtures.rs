//! Static demo data served by the chat screens.

use crate::models::chat::{ChatContact, ChatMessage};

/// Name the current user appears under in every conversation.
pub const SELF_NAME: &str = "User1";

/// `(name, status, unread, [(outgoing, text, time)])`
type Conversation = (&'static str, &'static str, u32, &'static [(bool, &'static str, &'static str)]);

const CONVERSATIONS: &[Conversation] = &[
    (
        "John Doe",
        "online",
        2,
        &[
            (true, "Hey, how are you doing?", "2:30 PM"),
            (false, "I'm doing great! How about you?", "2:32 PM"),
            (true, "Pretty good! Working on the new project.", "2:35 PM"),
        ],
    ),
    (
        "Jane Smith",
        "offline",
        0,
        &[
            (true, "The project is ready for review", "1:45 PM"),
            (false, "Perfect! I'll take a look at it.", "1:47 PM"),
        ],
    ),
    (
        "Mike Johnson",
        "online",
        1,
        &[
            (true, "Can we schedule a meeting?", "12:20 PM"),
            (false, "Sure! How about tomorrow at 2 PM?", "12:25 PM"),
            (true, "That works for me!", "12:30 PM"),
        ],
    ),
    (
        "Sarah Wilson",
        "away",
        0,
        &[(true, "Thanks for the update!", "11:15 AM")],
    ),
    (
        "David Brown",
        "online",
        3,
        &[
            (true, "I'll send you the files", "10:30 AM"),
            (false, "Great! I'm waiting for them.", "10:35 AM"),
            (true, "Just sent them over.", "10:40 AM"),
        ],
    ),
];

/// Contact list. The preview shows the opening message of each conversation.
pub fn chat_contacts() -> Vec<ChatContact> {
    CONVERSATIONS
        .iter()
        .enumerate()
        .map(|(i, (name, status, unread, messages))| {
            let (_, text, time) = messages.first().copied().unwrap_or((true, "", ""));
            ChatContact {
                id: i as u32 + 1,
                name: name.to_string(),
                avatar: format!("/images/users/user-{}.png", i + 1),
                status: status.to_string(),
                last_message: text.to_string(),
                last_message_time: time.to_string(),
                unread_count: *unread,
            }
        })
        .collect()
}

/// Message history with `user`, empty for unknown names.
pub fn chat_history(user: &str) -> Vec<ChatMessage> {
    CONVERSATIONS
        .iter()
        .find(|(name, ..)| *name == user)
        .map(|(name, _, _, messages)| {
            messages
                .iter()
                .enumerate()
                .map(|(i, (outgoing, text, time))| {
                    let (from, to) = if *outgoing {
                        (SELF_NAME, *name)
                    } else {
                        (*name, SELF_NAME)
                    };
                    ChatMessage {
                        id: i as u32 + 1,
                        from: from.to_string(),
                        to: to.to_string(),
                        text: text.to_string(),
                        time: time.to_string(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contacts_preview_their_first_message() {
        let contacts = chat_contacts();
        assert_eq!(contacts.len(), 5);
        assert_eq!(contacts[0].name, "John Doe");
        assert_eq!(contacts[0].last_message, "Hey, how are you doing?");
        assert_eq!(contacts[4].unread_count, 3);
    }

    #[test]
    fn history_alternates_direction() {
        let history = chat_history("Jane Smith");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from, SELF_NAME);
        assert_eq!(history[1].from, "Jane Smith");
        assert_eq!(history[1].to, SELF_NAME);
    }

    #[test]
    fn unknown_user_has_no_history() {
        assert!(chat_history("Nobody").is_empty());
    }
}

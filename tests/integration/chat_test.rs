// tests/integration/chat_test.rs

//! Integration tests for chat relaying and the manager list.

use super::test_helpers::{TestContext, assert_timestamped};
use relaychat::core::handler::RouteResponse;

#[tokio::test]
async fn test_chat_reaches_everyone_but_the_sender() {
    let ctx = TestContext::new().await;
    let mut alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    assert_eq!(ctx.chat(&alice, "hi"), RouteResponse::Continue);

    let bob_msgs = bob.drain();
    assert_eq!(bob_msgs.len(), 1);
    assert_timestamped(&bob_msgs[0], "alice: hi");
    let carol_msgs = carol.drain();
    assert_eq!(carol_msgs.len(), 1);
    assert_timestamped(&carol_msgs[0], "alice: hi");
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn test_manager_chat_carries_marker() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");

    ctx.chat(&admin, "welcome");

    let msgs = bob.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "@admin1: welcome");
}

#[tokio::test]
async fn test_chat_preserves_content_verbatim() {
    let ctx = TestContext::new().await;
    let alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");

    ctx.chat(&alice, "  spaced out  ");

    let msgs = bob.drain();
    assert_timestamped(&msgs[0], "alice:   spaced out  ");
}

#[tokio::test]
async fn test_messages_from_one_sender_keep_their_order() {
    let ctx = TestContext::new().await;
    let alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");

    for i in 0..20 {
        ctx.chat(&alice, &format!("message {i}"));
    }

    let msgs = bob.drain();
    assert_eq!(msgs.len(), 20);
    for (i, line) in msgs.iter().enumerate() {
        assert_timestamped(line, &format!("alice: message {i}"));
    }
}

#[tokio::test]
async fn test_view_managers_is_unicast() {
    let ctx = TestContext::new().await;
    let mut alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");

    ctx.chat(&alice, "view-managers");

    assert_eq!(
        alice.drain(),
        vec!["Managers List\n-------------\nadmin1\nadmin2\nadmin3\n".to_string()]
    );
    assert!(bob.drain().is_empty());
}

#[tokio::test]
async fn test_view_managers_lists_promotions_in_order() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin2");
    let mut bob = ctx.connect("bob");

    ctx.send(&admin, relaychat::core::CommandCode::Promote, "bob");
    bob.drain();
    ctx.chat(&bob, " view-managers ");

    assert_eq!(
        bob.drain(),
        vec!["Managers List\n-------------\nadmin1\nadmin2\nadmin3\nbob\n".to_string()]
    );
}

#[tokio::test]
async fn test_muted_user_cannot_view_managers() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");

    ctx.send(&admin, relaychat::core::CommandCode::Mute, "bob");
    bob.drain();
    ctx.chat(&bob, "view-managers");

    let msgs = bob.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "You are muted and cannot send messages.");
}

#[tokio::test]
async fn test_unknown_code_is_relayed_as_chat() {
    let ctx = TestContext::new().await;
    let alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");

    ctx.send(&alice, relaychat::core::CommandCode::Unknown(b'9'), "still here");

    let msgs = bob.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "alice: still here");
}

#[tokio::test]
async fn test_over_long_chat_line_is_refused() {
    let ctx = TestContext::new().await;
    let mut alice = ctx.connect("alice");
    let mut bob = ctx.connect("bob");

    // Fits in a frame, but not once the timestamp and name are added.
    let content = "x".repeat(995);
    ctx.chat(&alice, &content);

    assert!(bob.drain().is_empty());
    let msgs = alice.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "Message too long to relay.");
}

#[tokio::test]
async fn test_empty_username_frame_is_ignored() {
    let ctx = TestContext::new().await;
    let anon = ctx.connect_anonymous();
    let mut bob = ctx.connect("bob");

    let response = ctx.send_as(&anon, "", relaychat::core::CommandCode::Chat, "hello?");

    assert_eq!(response, RouteResponse::Continue);
    assert!(bob.drain().is_empty());
    assert_eq!(ctx.state.stats.get_total_commands(), 0);
}

#[tokio::test]
async fn test_long_manager_list_is_split_across_payloads() {
    let managers: Vec<String> = (0..11)
        .map(|i| format!("{i:02}{}", "m".repeat(97)))
        .collect();
    let config = relaychat::config::Config {
        managers: managers.clone(),
        ..relaychat::config::Config::default()
    };
    let ctx = TestContext::with_config(config).await;
    let mut alice = ctx.connect("alice");

    ctx.chat(&alice, "view-managers");

    let pages = alice.drain();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].starts_with("Managers List\n-------------\n"));
    assert!(pages.iter().all(|page| page.len() <= 999));
    let joined = pages.concat();
    let names: Vec<&str> = joined.lines().skip(2).collect();
    assert_eq!(names, managers);
}

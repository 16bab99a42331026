// tests/integration/moderation_test.rs

//! Integration tests for manager-only commands: promote, kick and mute.

use super::test_helpers::{TestContext, assert_timestamped};
use relaychat::core::CommandCode;
use relaychat::core::handler::RouteResponse;

// ===== Promote =====

#[tokio::test]
async fn test_non_manager_cannot_promote() {
    let ctx = TestContext::new().await;
    let mut carol = ctx.connect("carol");
    let mut bob = ctx.connect("bob");

    ctx.send(&carol, CommandCode::Promote, "bob");

    let msgs = carol.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "Only managers can promote other users!");
    assert!(bob.drain().is_empty());
    assert!(!ctx.state.registry.is_manager("bob"));
    assert_eq!(ctx.state.registry.managers(), vec!["admin1", "admin2", "admin3"]);
}

#[tokio::test]
async fn test_manager_promotes_and_everyone_hears_it() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    ctx.send(&admin, CommandCode::Promote, "bob");

    assert!(ctx.state.registry.is_manager("bob"));
    for msgs in [admin.drain(), bob.drain(), carol.drain()] {
        assert_eq!(msgs.len(), 1);
        assert_timestamped(&msgs[0], "bob has been promoted to manager.");
    }
}

#[tokio::test]
async fn test_promoting_a_manager_again() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");
    let mut other = ctx.connect("admin2");

    ctx.send(&admin, CommandCode::Promote, "admin2");

    let msgs = admin.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "@admin2 is already a manager.");
    assert!(other.drain().is_empty());
}

#[tokio::test]
async fn test_existence_is_checked_before_authority() {
    let ctx = TestContext::new().await;
    let mut carol = ctx.connect("carol");

    ctx.send(&carol, CommandCode::Kick, "ghost");

    let msgs = carol.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "User ghost doesn't exist.");
}

#[tokio::test]
async fn test_promotion_survives_disconnect() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let bob = ctx.connect("bob");

    ctx.send(&admin, CommandCode::Promote, "bob");
    ctx.state.registry.remove(bob.id);

    assert!(ctx.state.registry.is_manager("bob"));
    let mut bob_again = ctx.connect("bob");
    let mut carol = ctx.connect("carol");
    ctx.chat(&bob_again, "back");
    assert_timestamped(&carol.drain()[0], "@bob: back");
    assert!(bob_again.drain().is_empty());
}

// ===== Kick =====

#[tokio::test]
async fn test_kick_removes_target_and_announces_it() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    assert_eq!(ctx.send(&admin, CommandCode::Kick, "bob"), RouteResponse::Continue);

    assert_eq!(bob.drain(), vec!["KICKED".to_string()]);
    assert!(!bob.liveness.is_alive());
    assert!(!ctx.state.registry.exists("bob"));
    assert_eq!(ctx.state.registry.len(), 2);

    for msgs in [admin.drain(), carol.drain()] {
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("bob"));
        assert_timestamped(&msgs[0], "bob has been kicked from the chat!");
    }
}

#[tokio::test]
async fn test_kicked_queue_is_closed() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");

    ctx.send(&admin, CommandCode::Kick, "bob");

    assert_eq!(bob.rx.recv().await, Some("KICKED".to_string()));
    assert_eq!(bob.rx.recv().await, None);
}

#[tokio::test]
async fn test_manager_kicking_itself_disconnects() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");

    assert_eq!(
        ctx.send(&admin, CommandCode::Kick, "admin1"),
        RouteResponse::Disconnect
    );
    assert_eq!(admin.drain(), vec!["KICKED".to_string()]);
}

#[tokio::test]
async fn test_non_manager_cannot_kick() {
    let ctx = TestContext::new().await;
    let mut carol = ctx.connect("carol");
    let mut bob = ctx.connect("bob");

    ctx.send(&carol, CommandCode::Kick, " bob ");

    assert_timestamped(&carol.drain()[0], "Only managers can kick other users!");
    assert!(bob.drain().is_empty());
    assert!(ctx.state.registry.exists("bob"));
}

// ===== Mute =====

#[tokio::test]
async fn test_mute_notifies_manager_and_target() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin3");
    let mut bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    ctx.send(&admin, CommandCode::Mute, "bob");

    assert_timestamped(&admin.drain()[0], "bob has been muted.");
    assert_timestamped(&bob.drain()[0], "You have been muted by admin3.");
    assert!(carol.drain().is_empty());
    assert!(ctx.state.registry.is_muted("bob"));
}

#[tokio::test]
async fn test_muted_user_chat_is_not_relayed() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    ctx.send(&admin, CommandCode::Mute, "bob");
    bob.drain();
    carol.drain();

    ctx.chat(&bob, "can anyone hear me");

    assert!(carol.drain().is_empty());
    let msgs = bob.drain();
    assert_eq!(msgs.len(), 1);
    assert_timestamped(&msgs[0], "You are muted and cannot send messages.");
}

#[tokio::test]
async fn test_muting_twice() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");
    let mut bob = ctx.connect("bob");

    ctx.send(&admin, CommandCode::Mute, "bob");
    admin.drain();
    bob.drain();
    ctx.send(&admin, CommandCode::Mute, "bob");

    assert_timestamped(&admin.drain()[0], "bob is already muted.");
    assert!(bob.drain().is_empty());
}

#[tokio::test]
async fn test_mute_is_lifted_on_disconnect() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let bob = ctx.connect("bob");

    ctx.send(&admin, CommandCode::Mute, "bob");
    ctx.state.registry.remove(bob.id);

    assert!(!ctx.state.registry.is_muted("bob"));
}

#[tokio::test]
async fn test_muted_user_can_still_send_private_messages() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let bob = ctx.connect("bob");
    let mut carol = ctx.connect("carol");

    ctx.send(&admin, CommandCode::Mute, "bob");
    carol.drain();
    ctx.send(&bob, CommandCode::PrivateMessage, "carol psst");

    assert_timestamped(&carol.drain()[0], "!bob: psst");
}

#[tokio::test]
async fn test_muted_manager_can_still_moderate() {
    let ctx = TestContext::new().await;
    let admin = ctx.connect("admin1");
    let mut other_admin = ctx.connect("admin2");
    let mut bob = ctx.connect("bob");

    ctx.send(&admin, CommandCode::Mute, "admin2");
    other_admin.drain();
    bob.drain();

    ctx.send(&other_admin, CommandCode::Kick, "bob");

    assert_eq!(bob.drain(), vec!["KICKED".to_string()]);
    assert!(!ctx.state.registry.exists("bob"));
    assert_timestamped(&other_admin.drain()[0], "bob has been kicked from the chat!");
}

#[tokio::test]
async fn test_oversized_missing_target_gets_too_long_notice() {
    let ctx = TestContext::new().await;
    let mut admin = ctx.connect("admin1");
    let ghost = "g".repeat(990);

    for code in [CommandCode::Promote, CommandCode::Kick, CommandCode::Mute] {
        ctx.send(&admin, code, &ghost);

        let msgs = admin.drain();
        assert_eq!(msgs.len(), 1);
        assert_timestamped(&msgs[0], "Message too long to relay.");
    }
}

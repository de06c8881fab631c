mod common;

use axum::http::StatusCode;
use common::spawn_app;

#[tokio::test]
async fn test_dashboard_data_aggregates_portfolio() {
    let app = spawn_app().await;
    let cookie = app.signed_in("stats@example.com", "stats_user").await;

    let empty = app
        .dashboard(Some(&cookie), &[("action", "get_dashboard_data")])
        .await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["stats"]["portfolio_value"], 0.0);
    assert_eq!(empty.body["stats"]["active_positions"], 0);

    for (symbol, shares, price) in [("AAPL", "10", "150"), ("msft", "5", "20")] {
        let added = app
            .dashboard(
                Some(&cookie),
                &[
                    ("action", "add_to_portfolio"),
                    ("symbol", symbol),
                    ("shares", shares),
                    ("avg_price", price),
                ],
            )
            .await;
        assert_eq!(added.status, StatusCode::OK);
        assert_eq!(added.body["message"], "Added to portfolio successfully");
    }
    app.dashboard(
        Some(&cookie),
        &[("action", "add_to_watchlist"), ("symbol", "TSLA")],
    )
    .await;

    let data = app
        .dashboard(Some(&cookie), &[("action", "get_dashboard_data")])
        .await;
    let stats = &data.body["stats"];
    assert_eq!(stats["portfolio_value"], 1600.0);
    assert_eq!(stats["active_positions"], 2);
    assert_eq!(stats["watchlist_count"], 1);
    assert_eq!(stats["portfolio_change"], 0.0);
    assert_eq!(stats["day_pl"], 0.0);
    assert_eq!(stats["day_pl_percent"], 0.0);

    assert_eq!(data.body["movers"]["gainers"][0]["symbol"], "AAPL");
    assert_eq!(data.body["movers"]["losers"][0]["change"], -2.5);
    assert_eq!(data.body["movers"]["active"].as_array().unwrap().len(), 3);
    assert_eq!(
        data.body["activity"][0]["description"],
        "Dashboard loaded successfully"
    );
    assert_eq!(data.body["activity"][0]["timestamp"], "2025-03-03 14:30:00");
    assert_eq!(
        data.body["market_status"],
        serde_json::json!({"status": "open", "next_close": "16:00 EST"})
    );
}

#[tokio::test]
async fn test_portfolio_newest_first() {
    let app = spawn_app().await;
    let cookie = app.signed_in("order@example.com", "order_user").await;

    for symbol in ["AAA", "BBB"] {
        app.dashboard(
            Some(&cookie),
            &[
                ("action", "add_to_portfolio"),
                ("symbol", symbol),
                ("shares", "1"),
                ("avg_price", "1.5"),
                ("company_name", "Example Corp"),
            ],
        )
        .await;
        app.clock.advance(chrono::Duration::minutes(1));
    }

    let response = app
        .dashboard(Some(&cookie), &[("action", "get_portfolio")])
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let portfolio = response.body["portfolio"].as_array().unwrap();
    assert_eq!(portfolio.len(), 2);
    assert_eq!(portfolio[0]["symbol"], "BBB");
    assert_eq!(portfolio[1]["symbol"], "AAA");
    assert_eq!(portfolio[0]["company_name"], "Example Corp");
    assert!(portfolio[0]["notes"].is_null());
}

#[tokio::test]
async fn test_watchlist_rejects_duplicates() {
    let app = spawn_app().await;
    let cookie = app.signed_in("watch@example.com", "watch_user").await;

    let first = app
        .dashboard(
            Some(&cookie),
            &[("action", "add_to_watchlist"), ("symbol", "AAPL")],
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["message"], "Added to watchlist successfully");

    // Normalised to the same symbol
    let second = app
        .dashboard(
            Some(&cookie),
            &[("action", "add_to_watchlist"), ("symbol", " aapl ")],
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["success"], false);
    assert_eq!(second.body["message"], "Symbol already in watchlist");

    let list = app
        .dashboard(Some(&cookie), &[("action", "get_watchlist")])
        .await;
    let watchlist = list.body["watchlist"].as_array().unwrap();
    assert_eq!(watchlist.len(), 1);
    assert_eq!(watchlist[0]["symbol"], "AAPL");
}

#[tokio::test]
async fn test_watchlist_remove() {
    let app = spawn_app().await;
    let cookie = app.signed_in("unwatch@example.com", "unwatch_user").await;

    let missing = app
        .dashboard(
            Some(&cookie),
            &[("action", "remove_from_watchlist"), ("symbol", "NFLX")],
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    app.dashboard(
        Some(&cookie),
        &[("action", "add_to_watchlist"), ("symbol", "NFLX")],
    )
    .await;

    let removed = app
        .dashboard(
            Some(&cookie),
            &[("action", "remove_from_watchlist"), ("symbol", "nflx")],
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Removed from watchlist successfully");

    let no_symbol = app
        .dashboard(Some(&cookie), &[("action", "remove_from_watchlist")])
        .await;
    assert_eq!(no_symbol.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_symbol.body["message"], "Symbol is required");
}

#[tokio::test]
async fn test_portfolio_validation() {
    let app = spawn_app().await;
    let cookie = app.signed_in("valid@example.com", "valid_user").await;

    for fields in [
        vec![("action", "add_to_portfolio"), ("shares", "1"), ("avg_price", "1")],
        vec![
            ("action", "add_to_portfolio"),
            ("symbol", "AAPL"),
            ("shares", "0"),
            ("avg_price", "1"),
        ],
        vec![
            ("action", "add_to_portfolio"),
            ("symbol", "AAPL"),
            ("shares", "3"),
        ],
    ] {
        let response = app.dashboard(Some(&cookie), &fields).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body["message"],
            "Symbol, shares, and average price are required"
        );
    }

    let no_id = app
        .dashboard(Some(&cookie), &[("action", "remove_from_portfolio")])
        .await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_id.body["message"], "Portfolio ID is required");

    let bad_id = app
        .dashboard(
            Some(&cookie),
            &[("action", "remove_from_portfolio"), ("id", "abc")],
        )
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_cannot_touch_each_others_rows() {
    let app = spawn_app().await;
    let alice = app.signed_in("alice@example.com", "alice").await;
    let bob = app.signed_in("bob@example.com", "bob_b").await;

    app.dashboard(
        Some(&alice),
        &[
            ("action", "add_to_portfolio"),
            ("symbol", "GOOGL"),
            ("shares", "2"),
            ("avg_price", "100"),
        ],
    )
    .await;

    let alice_portfolio = app
        .dashboard(Some(&alice), &[("action", "get_portfolio")])
        .await;
    let position_id = alice_portfolio.body["portfolio"][0]["id"]
        .as_i64()
        .unwrap()
        .to_string();

    let bob_view = app
        .dashboard(Some(&bob), &[("action", "get_portfolio")])
        .await;
    assert_eq!(bob_view.body["portfolio"], serde_json::json!([]));

    let bob_remove = app
        .dashboard(
            Some(&bob),
            &[("action", "remove_from_portfolio"), ("id", &position_id)],
        )
        .await;
    assert_eq!(bob_remove.status, StatusCode::NOT_FOUND);

    let still_there = app
        .dashboard(Some(&alice), &[("action", "get_portfolio")])
        .await;
    assert_eq!(still_there.body["portfolio"].as_array().unwrap().len(), 1);

    let alice_remove = app
        .dashboard(
            Some(&alice),
            &[("action", "remove_from_portfolio"), ("id", &position_id)],
        )
        .await;
    assert_eq!(alice_remove.status, StatusCode::OK);
    assert_eq!(
        alice_remove.body["message"],
        "Removed from portfolio successfully"
    );

    // Both users may watch the same symbol
    for cookie in [&alice, &bob] {
        let response = app
            .dashboard(
                Some(cookie),
                &[("action", "add_to_watchlist"), ("symbol", "SPY")],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_news_and_alerts() {
    let app = spawn_app().await;
    let cookie = app.signed_in("news@example.com", "news_user").await;

    let news = app
        .dashboard(Some(&cookie), &[("action", "get_news")])
        .await;
    assert_eq!(news.status, StatusCode::OK);
    let item = &news.body["news"][0];
    assert_eq!(item["title"], "Market Update: Strong Trading Session");
    assert_eq!(item["source"], "Market News");
    assert_eq!(item["published_at"], "2025-03-03 13:30:00");
    assert_eq!(item["url"], "#");
    assert!(item["image"].is_null());

    let alerts = app
        .dashboard(Some(&cookie), &[("action", "get_alerts")])
        .await;
    assert_eq!(
        alerts.body,
        serde_json::json!({"success": true, "alerts": []})
    );
}

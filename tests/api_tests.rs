use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

mod common;
use common::{TestApp, TestUser};

fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}

async fn create_expense(
    app: &TestApp,
    user: &TestUser,
    category_id: &str,
    payment_method_id: &str,
    title: &str,
    amount: &str,
    expense_date: &str,
) -> Value {
    let response = app
        .post(
            "/expenses",
            &user.token,
            &json!({
                "categoryId": category_id,
                "paymentMethodId": payment_method_id,
                "title": title,
                "amount": amount,
                "expenseDate": expense_date
            }),
        )
        .await;
    assert_eq!(response.status(), 201, "expense creation failed");
    response.json().await
}

// ============================================================================
// Health and authentication
// ============================================================================

#[actix_rt::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_list_expenses_requires_token() {
    let app = TestApp::new().await;

    let response = app.get("/expenses", None).await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_list_expenses_rejects_invalid_token() {
    let app = TestApp::new().await;

    let response = app.get("/expenses", Some("not-a-real-token")).await;

    assert_eq!(response.status(), 401);
}

// ============================================================================
// Expense listing
// ============================================================================

#[actix_rt::test]
async fn test_list_expenses_empty() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let response = app.get("/expenses", Some(&user.token)).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["totalCount"], 0);
    assert_eq!(body["pagination"]["totalPages"], 0);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["pageSize"], 10);
    assert!(body["pagination"]["nextPage"].is_null());
    assert!(body["pagination"]["prevPage"].is_null());
    assert_eq!(body["meta"]["totalCount"], 0);
    assert_eq!(dec(&body["meta"]["totalAmount"]), Decimal::ZERO);
}

#[actix_rt::test]
async fn test_create_then_list_includes_related_items() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "500").await;
    let card = app.create_payment_method(&user, "Card").await;

    let created = create_expense(
        &app,
        &user,
        &food,
        &card,
        "  Groceries  ",
        "42.50",
        "2025-01-10T10:00:00Z",
    )
    .await;
    assert_eq!(created["title"], "Groceries");
    assert_eq!(dec(&created["amount"]), Decimal::from_str("42.50").unwrap());

    let response = app.get("/expenses", Some(&user.token)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["categoryId"], food.as_str());
    assert_eq!(body["relatedItems"]["categories"][&food]["name"], "Food");
    assert_eq!(body["relatedItems"]["paymentMethods"][&card]["name"], "Card");
    assert_eq!(body["meta"]["totalCount"], 1);
    assert_eq!(
        dec(&body["meta"]["totalAmount"]),
        Decimal::from_str("42.50").unwrap()
    );
}

#[actix_rt::test]
async fn test_list_expenses_second_page() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    for day in 1..=3 {
        create_expense(
            &app,
            &user,
            &food,
            &card,
            &format!("Meal {day}"),
            "10",
            &format!("2025-01-0{day}T12:00:00Z"),
        )
        .await;
    }

    let response = app
        .get("/expenses?page=2&pageSize=2", Some(&user.token))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    // Newest first, so the oldest lands on the last page
    assert_eq!(data[0]["title"], "Meal 1");
    assert_eq!(body["pagination"]["totalCount"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert!(body["pagination"]["nextPage"].is_null());
    assert_eq!(body["pagination"]["prevPage"], 1);
    // Totals cover every match, not just the page
    assert_eq!(body["meta"]["totalCount"], 3);
    assert_eq!(dec(&body["meta"]["totalAmount"]), Decimal::from(30));
}

#[actix_rt::test]
async fn test_list_expenses_page_past_end() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;
    create_expense(&app, &user, &food, &card, "Snack", "5", "2025-01-01T12:00:00Z").await;

    let response = app.get("/expenses?page=5", Some(&user.token)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["currentPage"], 5);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert!(body["pagination"]["nextPage"].is_null());
    assert!(body["pagination"]["prevPage"].is_null());
    assert_eq!(body["meta"]["totalCount"], 1);
}

#[actix_rt::test]
async fn test_list_expenses_rejects_page_zero() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let response = app.get("/expenses?page=0", Some(&user.token)).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_list_expenses_filters_by_category() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let travel = app.create_category(&user, "Travel", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    create_expense(&app, &user, &food, &card, "Lunch", "20", "2025-01-05T12:00:00Z").await;
    create_expense(&app, &user, &travel, &card, "Taxi", "35", "2025-01-05T13:00:00Z").await;

    let response = app
        .get(&format!("/expenses?categoryId={travel}"), Some(&user.token))
        .await;
    let body: Value = response.json().await;

    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Taxi");
    assert!(body["relatedItems"]["categories"].get(&food).is_none());
    assert_eq!(body["meta"]["totalCount"], 1);
}

#[actix_rt::test]
async fn test_expenses_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let alice = TestUser::new();
    let bob = TestUser::new();
    let food = app.create_category(&alice, "Food", "0").await;
    let card = app.create_payment_method(&alice, "Card").await;
    create_expense(&app, &alice, &food, &card, "Lunch", "20", "2025-01-05T12:00:00Z").await;

    let response = app.get("/expenses", Some(&bob.token)).await;
    let body: Value = response.json().await;

    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["meta"]["totalCount"], 0);
}

// ============================================================================
// Expense writes
// ============================================================================

#[actix_rt::test]
async fn test_create_expense_with_foreign_category() {
    let app = TestApp::new().await;
    let alice = TestUser::new();
    let bob = TestUser::new();
    let bobs_category = app.create_category(&bob, "Rent", "0").await;
    let card = app.create_payment_method(&alice, "Card").await;

    let response = app
        .post(
            "/expenses",
            &alice.token,
            &json!({
                "categoryId": bobs_category,
                "paymentMethodId": card,
                "title": "Sneaky",
                "amount": "10",
                "expenseDate": "2025-01-05T12:00:00Z"
            }),
        )
        .await;

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "OWNERSHIP_ERROR");

    let listing: Value = app.get("/expenses", Some(&alice.token)).await.json().await;
    assert_eq!(listing["meta"]["totalCount"], 0);
}

#[actix_rt::test]
async fn test_create_expense_negative_amount() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    let response = app
        .post(
            "/expenses",
            &user.token,
            &json!({
                "categoryId": food,
                "paymentMethodId": card,
                "title": "Refund",
                "amount": "-5",
                "expenseDate": "2025-01-05T12:00:00Z"
            }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_update_expense() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let travel = app.create_category(&user, "Travel", "0").await;
    let card = app.create_payment_method(&user, "Card").await;
    let created =
        create_expense(&app, &user, &food, &card, "Lunch", "20", "2025-01-05T12:00:00Z").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .put(
            &format!("/expenses/{id}"),
            &user.token,
            &json!({
                "categoryId": travel,
                "paymentMethodId": card,
                "title": "Train",
                "amount": "75",
                "expenseDate": "2025-01-06T08:00:00Z"
            }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["id"], id);
    assert_eq!(body["title"], "Train");
    assert_eq!(body["categoryId"], travel.as_str());
    assert_eq!(dec(&body["amount"]), Decimal::from(75));
}

#[actix_rt::test]
async fn test_update_foreign_expense_is_not_found() {
    let app = TestApp::new().await;
    let alice = TestUser::new();
    let bob = TestUser::new();
    let food = app.create_category(&alice, "Food", "0").await;
    let card = app.create_payment_method(&alice, "Card").await;
    let created =
        create_expense(&app, &alice, &food, &card, "Lunch", "20", "2025-01-05T12:00:00Z").await;
    let id = created["id"].as_str().unwrap();

    let bobs_food = app.create_category(&bob, "Food", "0").await;
    let bobs_card = app.create_payment_method(&bob, "Card").await;

    let response = app
        .put(
            &format!("/expenses/{id}"),
            &bob.token,
            &json!({
                "categoryId": bobs_food,
                "paymentMethodId": bobs_card,
                "title": "Hijack",
                "amount": "1",
                "expenseDate": "2025-01-05T12:00:00Z"
            }),
        )
        .await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "NOT_FOUND");
}

// ============================================================================
// Search
// ============================================================================

#[actix_rt::test]
async fn test_search_returns_latest_per_title() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    create_expense(&app, &user, &food, &card, "Coffee", "3", "2025-01-01T08:00:00Z").await;
    create_expense(&app, &user, &food, &card, "Coffee", "4", "2025-01-03T08:00:00Z").await;
    create_expense(&app, &user, &food, &card, "Lunch", "12", "2025-01-03T12:00:00Z").await;

    let response = app
        .get("/expenses/search?title=COFF", Some(&user.token))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Coffee");
    assert_eq!(dec(&data[0]["amount"]), Decimal::from(4));
    assert_eq!(body["relatedItems"]["categories"][&food]["name"], "Food");
}

#[actix_rt::test]
async fn test_search_blank_title() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let response = app
        .get("/expenses/search?title=%20%20", Some(&user.token))
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// Aggregates
// ============================================================================

#[actix_rt::test]
async fn test_daily_totals_respect_reporting_day() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    // With the default +05:30 offset, 2025-01-10 spans
    // 2025-01-09T18:30:00Z up to (not including) 2025-01-10T18:30:00Z.
    create_expense(&app, &user, &food, &card, "Before", "1", "2025-01-09T18:29:59Z").await;
    create_expense(&app, &user, &food, &card, "First", "10", "2025-01-09T18:30:00Z").await;
    create_expense(&app, &user, &food, &card, "Last", "20", "2025-01-10T18:29:59Z").await;
    create_expense(&app, &user, &food, &card, "After", "100", "2025-01-10T18:30:00Z").await;

    let response = app
        .get(
            "/expenses/stats/total-per-day?startDate=2025-01-10&endDate=2025-01-10",
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["day"], "2025-01-10");
    assert_eq!(data[0]["count"], 2);
    assert_eq!(dec(&data[0]["totalAmount"]), Decimal::from(30));
    assert_eq!(body["meta"]["totalCount"], 2);
}

#[actix_rt::test]
async fn test_daily_totals_ascending_and_sparse() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;

    create_expense(&app, &user, &food, &card, "C", "3", "2025-01-05T06:00:00Z").await;
    create_expense(&app, &user, &food, &card, "A", "1", "2025-01-01T06:00:00Z").await;
    create_expense(&app, &user, &food, &card, "B", "2", "2025-01-01T07:00:00Z").await;

    let body: Value = app
        .get("/expenses/stats/total-per-day", Some(&user.token))
        .await
        .json()
        .await;

    let days: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["day"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2025-01-01", "2025-01-05"]);
    assert_eq!(body["meta"]["totalCount"], 3);
}

#[actix_rt::test]
async fn test_category_stats_ranked_by_total() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "500").await;
    let travel = app.create_category(&user, "Travel", "150").await;
    let unused = app.create_category(&user, "Gifts", "50").await;
    let card = app.create_payment_method(&user, "Card").await;

    create_expense(&app, &user, &food, &card, "Lunch", "100", "2025-01-05T06:00:00Z").await;
    create_expense(&app, &user, &food, &card, "Dinner", "50", "2025-01-05T15:00:00Z").await;
    create_expense(&app, &user, &travel, &card, "Flight", "200", "2025-01-06T06:00:00Z").await;

    let response = app.get("/categories/stats", Some(&user.token)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    let stats = body.as_array().unwrap();

    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0]["id"], travel.as_str());
    assert_eq!(dec(&stats[0]["totalAmount"]), Decimal::from(200));
    assert_eq!(stats[0]["count"], 1);
    assert_eq!(dec(&stats[0]["remainingAmount"]), Decimal::from(-50));

    assert_eq!(stats[1]["id"], food.as_str());
    assert_eq!(dec(&stats[1]["totalAmount"]), Decimal::from(150));
    assert_eq!(stats[1]["count"], 2);
    assert_eq!(dec(&stats[1]["remainingAmount"]), Decimal::from(350));

    assert_eq!(stats[2]["id"], unused.as_str());
    assert_eq!(stats[2]["count"], 0);
    assert_eq!(dec(&stats[2]["totalAmount"]), Decimal::ZERO);
}

#[actix_rt::test]
async fn test_payment_method_stats_include_unused_methods() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "0").await;
    let card = app.create_payment_method(&user, "Card").await;
    let cash = app.create_payment_method(&user, "Cash").await;

    create_expense(&app, &user, &food, &card, "Lunch", "15", "2025-01-05T06:00:00Z").await;

    let body: Value = app
        .get("/payment-methods/stats", Some(&user.token))
        .await
        .json()
        .await;
    let stats = body.as_array().unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["id"], card.as_str());
    assert_eq!(stats[0]["count"], 1);
    assert_eq!(stats[1]["id"], cash.as_str());
    assert_eq!(stats[1]["count"], 0);
}

// ============================================================================
// Categories and payment methods
// ============================================================================

#[actix_rt::test]
async fn test_list_categories_ordered_by_name() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    app.create_category(&user, "Travel", "0").await;
    app.create_category(&user, "Food", "0").await;

    let body: Value = app.get("/categories", Some(&user.token)).await.json().await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["Food", "Travel"]);
}

#[actix_rt::test]
async fn test_create_category_empty_name() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let response = app
        .post("/categories", &user.token, &json!({ "name": "" }))
        .await;

    assert_eq!(response.status(), 400);
}

#[actix_rt::test]
async fn test_create_category_negative_budget() {
    let app = TestApp::new().await;
    let user = TestUser::new();

    let response = app
        .post(
            "/categories",
            &user.token,
            &json!({ "name": "Food", "budget": "-1" }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = app.get("/categories", Some(&user.token)).await.json().await;
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_update_category_negative_budget_keeps_original() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "100").await;

    let response = app
        .patch(
            &format!("/categories/{food}"),
            &user.token,
            &json!({ "budget": "-5" }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = app.get("/categories", Some(&user.token)).await.json().await;
    assert_eq!(dec(&body[0]["budget"]), Decimal::from(100));
}

#[actix_rt::test]
async fn test_update_category_budget() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    let food = app.create_category(&user, "Food", "100").await;

    let response = app
        .patch(
            &format!("/categories/{food}"),
            &user.token,
            &json!({ "budget": "250" }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["name"], "Food");
    assert_eq!(dec(&body["budget"]), Decimal::from(250));
}

#[actix_rt::test]
async fn test_update_foreign_category_is_not_found() {
    let app = TestApp::new().await;
    let alice = TestUser::new();
    let bob = TestUser::new();
    let food = app.create_category(&alice, "Food", "100").await;

    let response = app
        .patch(
            &format!("/categories/{food}"),
            &bob.token,
            &json!({ "name": "Mine now" }),
        )
        .await;

    assert_eq!(response.status(), 404);
}

#[actix_rt::test]
async fn test_list_payment_methods() {
    let app = TestApp::new().await;
    let user = TestUser::new();
    app.create_payment_method(&user, "Cash").await;

    let response = app.get("/payment-methods", Some(&user.token)).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Cash");
}

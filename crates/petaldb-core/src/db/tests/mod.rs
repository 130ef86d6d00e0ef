mod film;

use crate::{
    db::{Db, DbSession},
    model::{
        film::person::PersonSlots,
        shop::{
            order::{Order, OrderSlots},
            order_line::{OrderLine, OrderLineSlots},
            product::ProductSlots,
        },
    },
    store::MemoryStore,
};

// Seed records in the shape the original admin UI ships as JSON test data.
const PRODUCT_FIXTURES: &str = r#"[
  { "product_id": "7", "name": "Tulip",      "vase_size": 2, "category": 1, "price": 9.5 },
  { "product_id": "8", "name": "Rose",       "vase_size": 1, "category": 1, "price": 12.0 },
  { "product_id": "9", "name": "Glass Vase", "vase_size": 3, "category": 2, "price": 24.0 }
]"#;

const LINE_FIXTURES: &str = r#"[
  { "line_id": 1, "product_ref": "7", "amount": 2 },
  { "line_id": 2, "product_ref": "7", "amount": 1 },
  { "line_id": 3, "product_ref": "8", "amount": 3 }
]"#;

const PERSON_FIXTURES: &str = r#"[
  { "person_id": "11", "name": "Greta Gerwig", "biography": "Director and actor" },
  { "person_id": "21", "name": "Saoirse Ronan" },
  { "person_id": "22", "name": "Timothée Chalamet" }
]"#;

fn session(store: &MemoryStore) -> DbSession<'_> {
    DbSession::new(Db::new(store))
}

fn seed_shop(session: &DbSession<'_>) {
    let products: Vec<ProductSlots> = serde_json::from_str(PRODUCT_FIXTURES).unwrap();
    for slots in products {
        session
            .add(crate::model::shop::product::Product::new(slots).unwrap())
            .unwrap();
    }

    let lines: Vec<OrderLineSlots> = serde_json::from_str(LINE_FIXTURES).unwrap();
    for slots in lines {
        session.add(OrderLine::new(slots).unwrap()).unwrap();
    }
}

// Build an order embedding the current snapshot entries of the given lines,
// the way the order form picks existing lines.
fn add_order(session: &DbSession<'_>, order_id: &str, line_ids: &[u32]) -> Order {
    let lines = line_ids
        .iter()
        .map(|id| {
            session
                .retrieve::<OrderLine>(&id.to_string())
                .unwrap()
                .unwrap()
                .entry()
        })
        .collect();

    session
        .add(
            Order::new(OrderSlots {
                order_id: order_id.into(),
                customer_name: "Ada".into(),
                date_of_purchase: "2022-07-14".into(),
                delivery_address: "1 Main St".into(),
                lines,
            })
            .unwrap(),
        )
        .unwrap()
}

fn person_slots(index: usize) -> PersonSlots {
    let persons: Vec<PersonSlots> = serde_json::from_str(PERSON_FIXTURES).unwrap();

    persons[index].clone()
}

//! Messenger hand-off: order and "buy now" messages plus the `wa.me` deep
//! link that opens a chat with the shop prefilled with them.

use std::fmt::Write as _;

use crate::catalog::Product;
use crate::order::NewOrder;

/// Errors from configuring a [`Messenger`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MessengerError {
    #[error("messenger phone number must contain digits")]
    EmptyPhone,
}

/// The shop's messenger account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messenger {
    phone: String,
}

impl Messenger {
    /// Create from a phone number in any common notation.
    ///
    /// Everything except digits is dropped, so `+7 (910) 356-11-90` and
    /// `79103561190` are the same account.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::EmptyPhone`] if no digits remain.
    pub fn new(phone: &str) -> Result<Self, MessengerError> {
        let phone: String = phone.chars().filter(char::is_ascii_digit).collect();
        if phone.is_empty() {
            return Err(MessengerError::EmptyPhone);
        }
        Ok(Self { phone })
    }

    /// The normalized phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// `https://wa.me/<phone>?text=<percent-encoded text>`.
    #[must_use]
    pub fn deep_link(&self, text: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.phone,
            urlencoding::encode(text)
        )
    }
}

/// The order summary sent to the shop after checkout.
#[must_use]
pub fn order_message(order: &NewOrder) -> String {
    let mut message = format!(
        "🛒 Новый заказ {}\n\n👤 Клиент: {}\n📞 Телефон: {}\n",
        order.order_number, order.customer_name, order.customer_phone
    );
    if let Some(email) = &order.customer_email {
        let _ = writeln!(message, "📧 Email: {email}");
    }

    message.push_str("\n📦 Товары:\n");
    let lines: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "• {} - {} шт. × {} = {}",
                item.name,
                item.quantity,
                item.price,
                item.line_total()
            )
        })
        .collect();
    message.push_str(&lines.join("\n"));

    let _ = writeln!(message, "\n\n💰 Итого: {}", order.total_amount);
    if let Some(notes) = &order.notes {
        let _ = write!(message, "\n📝 Примечания: {notes}");
    }
    message
}

/// Message for buying a single product straight from the catalog.
#[must_use]
pub fn buy_now_message(product: &Product) -> String {
    format!(
        "Здравствуйте, хочу купить: {}. Подскажите реквизиты для оплаты.",
        product.name
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::order::{OrderItem, OrderNumber};
    use crate::types::{OrderStatus, PaymentStatus, Price, ProductId};

    fn order(email: Option<&str>, notes: Option<&str>) -> NewOrder {
        let items = vec![
            OrderItem {
                id: ProductId::generate(),
                name: "Футболка".to_owned(),
                price: Price::new(1890).unwrap(),
                quantity: 2,
                image: String::new(),
            },
            OrderItem {
                id: ProductId::generate(),
                name: "Кепка".to_owned(),
                price: Price::new(990).unwrap(),
                quantity: 1,
                image: String::new(),
            },
        ];
        NewOrder {
            order_number: OrderNumber::from("ORD-20240115-1234".to_owned()),
            customer_name: "Анна".to_owned(),
            customer_phone: "+79001234567".to_owned(),
            customer_email: email.map(str::to_owned),
            total_amount: items.iter().map(OrderItem::line_total).sum(),
            items,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            notes: notes.map(str::to_owned),
        }
    }

    #[test]
    fn test_order_message_layout() {
        let expected = "🛒 Новый заказ ORD-20240115-1234\n\n\
                        👤 Клиент: Анна\n\
                        📞 Телефон: +79001234567\n\
                        \n📦 Товары:\n\
                        • Футболка - 2 шт. × 1\u{a0}890\u{a0}₽ = 3\u{a0}780\u{a0}₽\n\
                        • Кепка - 1 шт. × 990\u{a0}₽ = 990\u{a0}₽\
                        \n\n💰 Итого: 4\u{a0}770\u{a0}₽\n";
        assert_eq!(order_message(&order(None, None)), expected);
    }

    #[test]
    fn test_order_message_optional_fields() {
        let message = order_message(&order(Some("anna@example.ru"), Some("Позвонить вечером")));
        assert!(message.contains("📞 Телефон: +79001234567\n📧 Email: anna@example.ru\n\n📦"));
        assert!(message.ends_with("₽\n\n📝 Примечания: Позвонить вечером"));
    }

    #[test]
    fn test_phone_is_normalized() {
        let messenger = Messenger::new("+7 (910) 356-11-90").unwrap();
        assert_eq!(messenger.phone(), "79103561190");
        assert_eq!(Messenger::new("  -- "), Err(MessengerError::EmptyPhone));
    }

    #[test]
    fn test_deep_link_encodes_text() {
        let messenger = Messenger::new("79103561190").unwrap();
        let link = messenger.deep_link("Привет & пока\n");
        assert_eq!(
            link,
            "https://wa.me/79103561190?text=%D0%9F%D1%80%D0%B8%D0%B2%D0%B5%D1%82%20%26%20%D0%BF%D0%BE%D0%BA%D0%B0%0A"
        );
    }

    #[test]
    fn test_buy_now_message() {
        let product = crate::catalog::Product {
            id: ProductId::generate(),
            name: "Чайник".to_owned(),
            description: String::new(),
            price: Price::new(2500).unwrap(),
            image: String::new(),
            image2: None,
            image3: None,
            category: "Кухня".to_owned(),
            subcategory: None,
            in_stock: true,
            created_at: Utc::now(),
        };
        assert_eq!(
            buy_now_message(&product),
            "Здравствуйте, хочу купить: Чайник. Подскажите реквизиты для оплаты."
        );
    }
}

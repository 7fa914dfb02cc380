// ==========================================
// 杂货库存管理系统 - 演示数据生成
// ==========================================
// 职责: 从内置商品清单随机生成商品（仅用于开发/演示库）
// ==========================================

use crate::domain::item::GroceryItem;
use crate::domain::types::{normalize_money, ShelfLife, ShelfLifeUnit};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// 内置商品模板
#[derive(Debug, Clone, Copy)]
pub struct ProductTemplate {
    pub description: &'static str,
    pub department: &'static str,
    pub unit: &'static str,
    pub shelf_life: (u32, ShelfLifeUnit),
    /// 售价区间（分）
    pub price_cents: (i64, i64),
}

const fn product(
    description: &'static str,
    department: &'static str,
    unit: &'static str,
    shelf_life: (u32, ShelfLifeUnit),
    price_cents: (i64, i64),
) -> ProductTemplate {
    ProductTemplate {
        description,
        department,
        unit,
        shelf_life,
        price_cents,
    }
}

use ShelfLifeUnit::{Days, Months, Weeks, Years};

pub const CATALOG: &[ProductTemplate] = &[
    product("Bananas", "Produce", "lb", (7, Days), (49, 79)),
    product("Gala Apples", "Produce", "lb", (4, Weeks), (129, 249)),
    product("Romaine Lettuce", "Produce", "ea", (10, Days), (149, 299)),
    product("Russet Potatoes", "Produce", "lb", (2, Months), (69, 129)),
    product("Yellow Onions", "Produce", "lb", (1, Months), (79, 149)),
    product("Whole Milk", "Dairy", "gal", (14, Days), (299, 499)),
    product("Cheddar Cheese", "Dairy", "lb", (6, Months), (499, 899)),
    product("Greek Yogurt", "Dairy", "ea", (3, Weeks), (99, 199)),
    product("Large Eggs", "Dairy", "doz", (5, Weeks), (229, 449)),
    product("Unsalted Butter", "Dairy", "lb", (4, Months), (399, 649)),
    product("Sourdough Bread", "Bakery", "ea", (5, Days), (349, 599)),
    product("Bagels", "Bakery", "pk", (7, Days), (299, 449)),
    product("Chicken Breast", "Meat", "lb", (3, Days), (349, 699)),
    product("Ground Beef", "Meat", "lb", (2, Days), (449, 799)),
    product("Atlantic Salmon", "Seafood", "lb", (2, Days), (899, 1499)),
    product("Spaghetti", "Dry Goods", "ea", (2, Years), (99, 249)),
    product("Long Grain Rice", "Dry Goods", "lb", (2, Years), (129, 299)),
    product("Black Beans", "Canned", "ea", (3, Years), (79, 149)),
    product("Tomato Soup", "Canned", "ea", (2, Years), (99, 229)),
    product("Olive Oil", "Pantry", "ea", (18, Months), (699, 1899)),
    product("Ground Coffee", "Beverages", "ea", (6, Months), (799, 1499)),
    product("Orange Juice", "Beverages", "gal", (10, Days), (399, 699)),
    product("Sparkling Water", "Beverages", "pk", (1, Years), (399, 599)),
    product("Frozen Peas", "Frozen", "ea", (1, Years), (129, 249)),
    product("Vanilla Ice Cream", "Frozen", "ea", (6, Months), (399, 799)),
    product("Paper Towels", "Household", "pk", (5, Years), (899, 2499)),
];

/// 随机生成商品
///
/// # 参数
/// - start_id: 首个商品编号，后续依次递增
/// - today: 入库日期与最近售出日期的参照日
pub fn generate_items<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    start_id: i64,
    today: NaiveDate,
) -> Vec<GroceryItem> {
    (0..count)
        .map(|offset| {
            let template = CATALOG[rng.gen_range(0..CATALOG.len())];
            generate_item(rng, &template, start_id + offset as i64, today)
        })
        .collect()
}

fn generate_item<R: Rng + ?Sized>(
    rng: &mut R,
    template: &ProductTemplate,
    id: i64,
    today: NaiveDate,
) -> GroceryItem {
    let (low, high) = template.price_cents;
    let price_cents = rng.gen_range(low..=high);
    // 毛利 15% ~ 45%
    let cost_cents = price_cents * rng.gen_range(55..=85) / 100;

    let date_added = today - Duration::days(rng.gen_range(0..=120));
    // 约五分之一的商品从未售出
    let last_sold = if rng.gen_ratio(1, 5) {
        None
    } else {
        let since_added = (today - date_added).num_days();
        Some(today - Duration::days(rng.gen_range(0..=since_added)))
    };

    let (amount, unit) = template.shelf_life;
    GroceryItem {
        id,
        description: template.description.to_string(),
        department: Some(template.department.to_string()),
        unit: template.unit.to_string(),
        shelf_life: ShelfLife::new(amount, unit),
        price: normalize_money(Decimal::new(price_cents, 2)),
        cost: normalize_money(Decimal::new(cost_cents, 2)),
        x_for: if rng.gen_ratio(1, 10) { 2 } else { 1 },
        quantity: rng.gen_range(0..=60),
        reorder_point: rng.gen_range(5..=15),
        last_sold,
        date_added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_items_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let items = generate_items(&mut rng, 200, 1000, today);

        assert_eq!(items.len(), 200);
        assert_eq!(items[0].id, 1000);
        assert_eq!(items[199].id, 1199);
        for item in &items {
            assert!(item.violations().is_empty(), "{:?}: {:?}", item, item.violations());
            assert!(item.cost <= item.price);
            assert!(item.date_added <= today);
            if let Some(last_sold) = item.last_sold {
                assert!(last_sold >= item.date_added && last_sold <= today);
            }
        }
    }

    #[test]
    fn test_same_seed_same_items() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = generate_items(&mut StdRng::seed_from_u64(42), 20, 1, today);
        let b = generate_items(&mut StdRng::seed_from_u64(42), 20, 1, today);
        assert_eq!(a, b);
    }
}

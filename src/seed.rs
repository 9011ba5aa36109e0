//! Sample catalog: three departments with four subcategories each and a
//! handful of products.

use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;

use crate::db::models::{NewCategory, NewProduct};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::errors::AppResult;
use crate::slug::slugify;

const DEPARTMENTS: [(&str, [&str; 4]); 3] = [
    ("Men", ["T-Shirts", "Pants", "Shoes", "Accessories"]),
    ("Women", ["Dresses", "Blouses", "Heels", "Bags"]),
    ("Kids", ["Tops", "Shorts", "Sneakers", "Toys"]),
];

/// (name, description, price in cents, department, subcategory)
const PRODUCTS: [(&str, &str, i64, &str, &str); 10] = [
    ("T-Shirt Slim Fit", "Slim fit cotton T-shirt for Men", 1999, "Men", "T-Shirts"),
    ("Classic Pants", "Straight fit men pants, navy blue", 3999, "Men", "Pants"),
    ("Running Shoes", "Lightweight men running shoes", 5999, "Men", "Shoes"),
    ("Leather Belt", "Genuine leather belt for men", 2450, "Men", "Accessories"),
    ("Summer Dress", "Floral print summer dress", 4990, "Women", "Dresses"),
    ("Blouse Elegant", "White office blouse for women", 2999, "Women", "Blouses"),
    ("High Heels", "Red high heels - size 37 to 41", 6900, "Women", "Heels"),
    ("Shoulder Bag", "Compact shoulder bag with strap", 3475, "Women", "Bags"),
    ("Kids Sneakers", "Comfortable sneakers for kids", 2730, "Kids", "Sneakers"),
    ("Soft Toys", "Plush stuffed toy for kids", 1499, "Kids", "Toys"),
];

fn random_sku<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

fn category(name: &str, description: String, parent_id: Option<i32>) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        slug: slugify(name),
        description: Some(description),
        parent_id,
        is_active: true,
    }
}

/// Loads the sample catalog into an empty store. Returns the number of
/// categories written, zero when the store already had data.
pub fn seed_catalog(categories: &dyn CategoryRepository, products: &dyn ProductRepository) -> AppResult<usize> {
    if !categories.all()?.is_empty() {
        log::info!("catalog already populated, skipping seed");
        return Ok(0);
    }

    let mut rng = rand::thread_rng();
    let mut written = 0;
    for (department, subcategories) in DEPARTMENTS {
        let parent = categories.create(category(department, format!("{} clothing category", department), None))?;
        written += 1;

        for sub in subcategories {
            let child = categories.create(category(sub, format!("{} for {}", sub, department), Some(parent.id)))?;
            written += 1;

            for (name, description, cents, _, _) in PRODUCTS
                .iter()
                .filter(|(_, _, _, dept, subcat)| *dept == department && *subcat == sub)
            {
                products.create_product(NewProduct {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    price: Decimal::new(*cents, 2),
                    sku: random_sku(&mut rng),
                    stock: rng.gen_range(10..=100),
                    is_active: true,
                    category_id: child.id,
                })?;
            }
        }
    }

    log::info!("seeded {} categories and {} products", written, PRODUCTS.len());
    Ok(written)
}

//! Plain-text rendering of product listings.

use crate::models::Product;

/// One listing line.
#[must_use]
pub fn product_line(product: &Product) -> String {
    let mut line = format!(
        "{}  {}  {} {} x {:.2} = {:.2}  {}",
        product.id,
        product.data_compra.format("%d/%m/%Y"),
        product.quantidade,
        product.unidade,
        product.valor_unitario,
        product.valor_total,
        product.nome,
    );
    if !product.marca.is_empty() {
        line.push_str(" (");
        line.push_str(&product.marca);
        line.push(')');
    }
    if !product.mercado.is_empty() {
        line.push_str(" @ ");
        line.push_str(&product.mercado);
    }
    if product.pending_sync {
        line.push_str(" [pendente]");
    }
    line
}

/// Listing lines, or a placeholder for an empty list.
#[must_use]
pub fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "Nenhum produto encontrado.".to_string();
    }
    products
        .iter()
        .map(product_line)
        .collect::<Vec<_>>()
        .join("\n")
}

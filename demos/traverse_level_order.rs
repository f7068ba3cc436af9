use avl_engine::Tree;

fn main() {
    let mut tree = Tree::new();
    tree.insert_batch([1, 2, 3, 4, 5, 6]);

    println!("Level-order traversal:");
    tree.traverse_level_order(|node| {
        println!(
            "Value: {}, Id: {}, Height: {}, Balance: {}",
            node.value(),
            node.id(),
            node.height(),
            node.balance_factor()
        );
    });
}

use avl_engine::input::{parse_batch, parse_value};
use avl_engine::{Tree, Workspace};

fn main() {
    let mut tree = Tree::new();
    tree.insert(10);
    tree.insert(20);
    tree.insert(30);
    assert_eq!(tree.root().map(|root| *root.value()), Some(20));
    assert!(!tree.insert(20));
    tree.remove(&20);
    assert!(tree.search(&20).is_none());
    println!("{:?}", tree);

    let mut workspace = Workspace::new();
    workspace.subscribe(|event| println!("re-render at revision {}", event.revision()));
    for input in ["42", "17", "42", "abc", ""] {
        match parse_value(input) {
            Ok(value) => println!("{}", workspace.insert(value)),
            Err(err) => println!("invalid input: {}", err),
        }
    }
    println!("{}", workspace.insert_batch(parse_batch("5, 8 13,21")));
    println!("{}", workspace.delete(&99));
    println!("{}", workspace.search(&13));
    println!("{}", workspace.reset());
}

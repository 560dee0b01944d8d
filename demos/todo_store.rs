//! Demonstration of a Store holding a todo list

use islet::Store;

#[derive(Clone, Debug)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum TodoFilter {
    All,
    Active,
    Completed,
}

#[derive(Clone, Debug)]
struct TodoList {
    todos: Vec<TodoItem>,
    filter: TodoFilter,
}

impl TodoList {
    fn new() -> Self {
        Self {
            todos: Vec::new(),
            filter: TodoFilter::All,
        }
    }

    fn add_todo(&mut self, title: &str) {
        let id = self.todos.len();
        self.todos.push(TodoItem {
            id,
            title: title.to_string(),
            completed: false,
        });
    }

    fn toggle_todo(&mut self, id: usize) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = !todo.completed;
        }
    }

    fn filtered_todos(&self) -> Vec<&TodoItem> {
        match self.filter {
            TodoFilter::All => self.todos.iter().collect(),
            TodoFilter::Active => self.todos.iter().filter(|t| !t.completed).collect(),
            TodoFilter::Completed => self.todos.iter().filter(|t| t.completed).collect(),
        }
    }

    fn stats(&self) -> (usize, usize, usize) {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|t| t.completed).count();
        (total, total - completed, completed)
    }
}

fn print_visible(store: &Store<TodoList>) {
    store.read(|list| {
        for todo in list.filtered_todos() {
            let status = if todo.completed { "✓" } else { " " };
            println!("   [{}] {}", status, todo.title);
        }
    });
}

fn main() -> islet::Result<()> {
    println!("=== Store Example: Todo List ===\n");

    let store = Store::new(TodoList::new());

    println!("1. Attaching a stats observer");
    let stats = store.subscribe(|store| {
        let (total, active, completed) = store.read(TodoList::stats);
        println!(
            "   [Store Update] Total: {}, Active: {}, Completed: {}",
            total, active, completed
        );
    })?;

    println!("\n2. Adding todos");
    for title in ["Learn Rust", "Share state between islands", "Write documentation"] {
        store.modify(|list| list.add_todo(title))?;
    }

    println!("\n3. Completing the first todo");
    store.modify(|list| list.toggle_todo(0))?;
    print_visible(&store);

    println!("\n4. A snapshot is ours to scribble on");
    let mut snapshot = store.get();
    snapshot.todos.clear();
    println!("   snapshot: {} todos, store: {} todos", snapshot.todos.len(), store.read(|l| l.todos.len()));

    println!("\n5. Detaching the stats observer and filtering quietly");
    store.detach(&stats)?;
    store.modify(|list| list.filter = TodoFilter::Active)?;
    print_visible(&store);

    println!("\n6. Detaching again is an error");
    if let Err(err) = store.detach(&stats) {
        println!("   {err}");
    }

    println!("\n✓ Example complete!");
    Ok(())
}

use super::dnd::{resolve_drop, target_for, SortableHost, SortableList};
use super::template::{render_template, NodeAction};
use super::TreeEditor;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader, DialogTitle,
    Input,
};
use crate::models::Level;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Shared by every row of one editor instance.
#[derive(Clone, Copy)]
struct EditorContext {
    editor: RwSignal<TreeEditor>,
    locked: Memo<bool>,
    /// Id of the row being dragged, if any.
    dragging: RwSignal<Option<String>>,
    /// Leaf whose content dialog is open.
    content_target: RwSignal<Option<String>>,
    content_draft: RwSignal<String>,
}

/// Cursor in the lower half of the hovered row means "insert after".
fn insert_after(ev: &web_sys::DragEvent) -> bool {
    ev.current_target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| el.get_bounding_client_rect())
        .map(|rect| {
            let mid = rect.top() + rect.height() / 2.0;
            (ev.client_y() as f64) >= mid
        })
        .unwrap_or(true)
}

#[component]
pub fn HierarchyEditor(editor: RwSignal<TreeEditor>) -> impl IntoView {
    let ctx = EditorContext {
        editor,
        locked: Memo::new(move |_| editor.with(|e| e.is_locked())),
        dragging: RwSignal::new(None),
        content_target: RwSignal::new(None),
        content_draft: RwSignal::new(String::new()),
    };
    provide_context(ctx);

    let roots = Memo::new(move |_| editor.with(|e| e.tree().roots().to_vec()));

    view! {
        <div class="hierarchy-editor flex flex-col gap-3">
            <div class="editor-toolbar">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    class="btn-add-part"
                    attr:disabled=move || ctx.locked.get()
                    on:click=move |_| {
                        editor.update(|e| {
                            e.add_part();
                        });
                    }
                >
                    {format!("+ Add {}", Level::Part.label())}
                </Button>
            </div>

            <Show
                when=move || !roots.get().is_empty()
                fallback=|| view! { <div class="text-sm text-muted-foreground">"No parts yet."</div> }
            >
                <ul class="parts-list tree-root" data-group=SortableList::root().group_name()>
                    <For each=move || roots.get() key=|id| id.clone() let:id>
                        <TreeNodeRow id=id />
                    </For>
                </ul>
            </Show>

            <ContentDialog />
        </div>
    }
}

#[component]
fn TreeNodeRow(id: String) -> impl IntoView {
    let ctx = expect_context::<EditorContext>();
    let editor = ctx.editor;

    let Some(level) = editor.with_untracked(|e| e.tree().get(&id).map(|n| n.level)) else {
        return ().into_any();
    };
    let template = render_template(level, &id);
    let id_sv = StoredValue::new(id.clone());

    let field = move |f: fn(&crate::tree::TreeNode) -> String| {
        Memo::new(move |_| {
            editor.with(|e| e.tree().get(&id_sv.get_value()).map(f).unwrap_or_default())
        })
    };
    let number = field(|n| n.number.clone());
    let name = field(|n| n.name.clone());

    let flag = move |f: fn(&crate::tree::TreeNode) -> bool| {
        Memo::new(move |_| {
            editor.with(|e| e.tree().get(&id_sv.get_value()).map(f).unwrap_or(false))
        })
    };
    let editable = flag(|n| n.editable);
    let expanded = flag(|n| n.expanded);
    let deleted = flag(|n| n.marks.deleted);
    let missing_name = flag(|n| n.missing_name());
    // Rows inside a deleted subtree take no new children.
    let closed = Memo::new(move |_| {
        editor.with(|e| e.tree().list_is_deleted(Some(&id_sv.get_value())))
    });

    let row_css = template.css_class();
    let row_class = Memo::new(move |_| {
        let marks = editor.with(|e| {
            e.tree()
                .get(&id_sv.get_value())
                .map(|n| n.marks.css_classes())
                .unwrap_or_default()
        });
        if marks.is_empty() {
            row_css.clone()
        } else {
            format!("{row_css} {marks}")
        }
    });

    let children = Memo::new(move |_| {
        editor.with(|e| {
            e.tree()
                .get(&id_sv.get_value())
                .map(|n| n.children.clone())
                .unwrap_or_default()
        })
    });
    let child_group = level.next().map(|l| format!("{l}-list")).unwrap_or_default();

    let on_number = Callback::new(move |v: String| {
        editor.update(|e| {
            e.set_number(&id_sv.get_value(), &v);
        });
    });
    let on_name = Callback::new(move |v: String| {
        editor.update(|e| {
            e.set_name(&id_sv.get_value(), &v);
        });
    });

    let run_action = move |action: NodeAction| {
        let id = id_sv.get_value();
        match action {
            NodeAction::AddChild(_) => editor.update(|e| {
                e.add_child(&id);
            }),
            NodeAction::EditContent => {
                if let Some(body) = editor.with_untracked(|e| e.content_for_edit(&id)) {
                    ctx.content_draft.set(body);
                    ctx.content_target.set(Some(id));
                }
            }
            NodeAction::Delete => editor.update(|e| {
                e.toggle_delete(&id);
            }),
            NodeAction::MoveUp => editor.update(|e| {
                e.move_up(&id);
            }),
            NodeAction::MoveDown => editor.update(|e| {
                e.move_down(&id);
            }),
        }
    };

    let actions = template
        .actions
        .iter()
        .copied()
        .map(|action| {
            let label = if action == NodeAction::Delete {
                Signal::derive(move || {
                    if deleted.get() {
                        "↺ Restore".to_string()
                    } else {
                        action.label()
                    }
                })
            } else {
                Signal::derive(move || action.label())
            };
            let add_child = matches!(action, NodeAction::AddChild(_));
            view! {
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Xs
                    class=action.class()
                    attr:disabled=move || ctx.locked.get() || (add_child && closed.get())
                    on:click=move |_| run_action(action)
                >
                    {move || label.get()}
                </Button>
            }
        })
        .collect_view();

    let on_drag_start = move |ev: web_sys::DragEvent| {
        ev.stop_propagation();
        if ctx.locked.get_untracked() {
            ev.prevent_default();
            return;
        }
        let id = id_sv.get_value();
        if let Some(dt) = ev.data_transfer() {
            let _ = dt.set_data("text/plain", &id);
            dt.set_effect_allowed("move");
        }
        ctx.dragging.set(Some(id));
    };

    let on_drag_over = move |ev: web_sys::DragEvent| {
        let Some(dragged) = ctx.dragging.get_untracked() else {
            return;
        };
        let accepts = editor.with_untracked(|e| {
            let Some(dragged_level) = e.tree().get(&dragged).map(|n| n.level) else {
                return false;
            };
            target_for(e.tree(), dragged_level, &id_sv.get_value(), insert_after(&ev)).is_some()
        });
        if accepts {
            ev.prevent_default();
            ev.stop_propagation();
            if let Some(dt) = ev.data_transfer() {
                dt.set_drop_effect("move");
            }
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();

        let dragged = ctx.dragging.get_untracked().or_else(|| {
            ev.data_transfer()
                .and_then(|dt| dt.get_data("text/plain").ok())
                .filter(|s| !s.trim().is_empty())
        });
        ctx.dragging.set(None);
        let Some(dragged) = dragged else {
            return;
        };

        let after = insert_after(&ev);
        let placement = editor.with_untracked(|e| {
            let dragged_level = e.tree().get(&dragged)?.level;
            let target = target_for(e.tree(), dragged_level, &id_sv.get_value(), after)?;
            resolve_drop(e.tree(), &dragged, &target)
        });
        if let Some(p) = placement {
            editor.update(|e| {
                e.on_sort_end(&p.list, &dragged, p.index);
            });
        }
    };

    view! {
        <li
            class=move || row_class.get()
            data-id=move || id_sv.get_value()
            data-level=level.to_string()
        >
            <div
                class="node-header flex items-center gap-2 py-1"
                draggable=move || if ctx.locked.get() { "false" } else { "true" }
                on:dragstart=on_drag_start
                on:dragend=move |_| ctx.dragging.set(None)
                on:dragover=on_drag_over
                on:drop=on_drop
            >
                {if template.collapsible {
                    view! {
                        <button
                            type="button"
                            class="toggle-btn w-4 text-xs text-muted-foreground"
                            aria-expanded=move || expanded.get().to_string()
                            on:click=move |_| editor.update(|e| e.toggle_expanded(&id_sv.get_value()))
                        >
                            {move || if expanded.get() { "▾" } else { "▸" }}
                        </button>
                    }
                        .into_any()
                } else {
                    view! { <span class="toggle-spacer w-4" /> }.into_any()
                }}

                <span class="node-label text-xs font-semibold text-muted-foreground">
                    {template.label}
                </span>
                <Input
                    class=format!("{} w-16", template.number.class)
                    placeholder=template.number.placeholder
                    value=number
                    disabled=Signal::derive(move || !editable.get() || ctx.locked.get())
                    on_input=on_number
                />
                <Input
                    class=format!("{} flex-1", template.name.class)
                    placeholder=template.name.placeholder
                    value=name
                    disabled=Signal::derive(move || !editable.get() || ctx.locked.get())
                    invalid=missing_name
                    on_input=on_name
                />
                <Show when=move || missing_name.get()>
                    <span class="field-hint text-xs text-destructive">"This field is required"</span>
                </Show>

                <div class="node-actions flex items-center gap-1">
                    {(!level.is_leaf())
                        .then(|| {
                            view! {
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Xs
                                    class="btn-small btn-edit"
                                    attr:disabled=move || ctx.locked.get() || editable.get()
                                    on:click=move |_| {
                                        editor.update(|e| {
                                            e.begin_edit(&id_sv.get_value());
                                        });
                                    }
                                >
                                    "✎ Edit"
                                </Button>
                            }
                        })}
                    {actions}
                </div>
            </div>

            {template
                .content_holder
                .is_some()
                .then(|| {
                    let body = Memo::new(move |_| {
                        editor.with(|e| {
                            e.tree()
                                .get(&id_sv.get_value())
                                .and_then(|n| n.content.clone())
                                .unwrap_or_default()
                        })
                    });
                    view! { <div class="content-holder" hidden=true>{move || body.get()}</div> }
                })}

            {(!level.is_leaf())
                .then(|| {
                    view! {
                        <ul
                            class="tree-children pl-6"
                            data-parent-id=move || id_sv.get_value()
                            data-group=child_group.clone()
                            style:display=move || if expanded.get() { "" } else { "none" }
                        >
                            <For each=move || children.get() key=|id| id.clone() let:child>
                                <TreeNodeRow id=child />
                            </For>
                        </ul>
                    }
                })}
        </li>
    }
    .into_any()
}

#[component]
fn ContentDialog() -> impl IntoView {
    let ctx = expect_context::<EditorContext>();

    let open = Signal::derive(move || ctx.content_target.get().is_some());
    let close = Callback::new(move |_| ctx.content_target.set(None));

    let confirm = move |_| {
        if let Some(id) = ctx.content_target.get_untracked() {
            let body = ctx.content_draft.get_untracked();
            ctx.editor.update(|e| {
                e.apply_content(&id, &body);
            });
        }
        ctx.content_target.set(None);
    };

    view! {
        <Dialog open=open on_close=close>
            <DialogHeader>
                <DialogTitle>"Edit content"</DialogTitle>
            </DialogHeader>
            <DialogBody>
                <textarea
                    class="content-editor min-h-48 w-full rounded-md border bg-transparent p-2 text-sm"
                    prop:value=move || ctx.content_draft.get()
                    on:input=move |ev| ctx.content_draft.set(event_target_value(&ev))
                />
            </DialogBody>
            <DialogFooter>
                <Button variant=ButtonVariant::Outline on:click=move |_| close.run(())>
                    "Cancel"
                </Button>
                <Button attr:disabled=move || ctx.locked.get() on:click=confirm>
                    "OK"
                </Button>
            </DialogFooter>
        </Dialog>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::tree::HierarchyTree;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_insert_after_defaults_to_true_without_target() {
        let ev = web_sys::DragEvent::new("dragover").unwrap();
        assert!(insert_after(&ev));
    }

    #[wasm_bindgen_test]
    fn test_editor_context_lock_follows_editor() {
        let owner = Owner::new();
        owner.set();
        let editor = RwSignal::new(TreeEditor::new(HierarchyTree::new()));
        let locked = Memo::new(move |_| editor.with(|e| e.is_locked()));
        assert!(!locked.get_untracked());
        editor.update(|e| {
            e.begin_save();
        });
        assert!(locked.get_untracked());
    }
}

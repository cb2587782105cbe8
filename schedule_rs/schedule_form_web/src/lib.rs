use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{File, HtmlInputElement};

use schedule_form::{
    CourseCard, CoursesView, InputMode, PageState, ResultsView, SelectedImage, DEFAULT_TERM_ID,
    NO_COURSES_MESSAGE,
};

mod fetch;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Terms offered in the selector; the first is the default.
const TERMS: &[(&str, &str)] = &[
    (DEFAULT_TERM_ID, "Fall 2025"),
    ("202601", "Spring 2026"),
    ("202501", "Spring 2025"),
];

fn input_from(ev: &leptos::ev::Event) -> Option<HtmlInputElement> {
    ev.target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
}

fn log_error(message: &str) {
    web_sys::console::error_1(&message.into());
}

#[component]
fn CourseRows(page: RwSignal<PageState>) -> impl IntoView {
    let required = move || page.with(|p| p.form.mode() == InputMode::Manual);
    let remove_disabled = move || page.with(|p| p.form.remove_disabled());

    view! {
        <div id="course-list">
            <For
                each=move || page.with(|p| p.form.rows().to_vec())
                key=|row| row.id
                children=move |row| {
                    let id = row.id;
                    view! {
                        <div class="course-input-row">
                            <input type="text" class="course-id" placeholder="Course ID (e.g., CMSC132)"
                                required=required
                                prop:value=move || page.with(|p| p.form.row(id).map(|r| r.course_id.clone()).unwrap_or_default())
                                on:input=move |ev| page.update(|p| p.form.set_course_id(id, event_target_value(&ev)))
                            />
                            <input type="text" class="course-section" placeholder="Section (e.g., 0101)"
                                required=required
                                prop:value=move || page.with(|p| p.form.row(id).map(|r| r.section.clone()).unwrap_or_default())
                                on:input=move |ev| page.update(|p| p.form.set_section(id, event_target_value(&ev)))
                            />
                            <button type="button" class="remove-course-button"
                                disabled=remove_disabled
                                on:click=move |_| page.update(|p| { p.form.remove_row(id); })
                            >"Remove"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}

fn course_card_view(card: CourseCard) -> impl IntoView {
    let meta_html = card.meta_html();
    view! {
        <div class="course-card">
            <h4>{card.title}</h4>
            <div class="course-meta" inner_html=meta_html></div>
            <div class="analysis-summary" inner_html=card.summary_html></div>
        </div>
    }
}

fn results_view(results: ResultsView) -> impl IntoView {
    let grade_style = if results.grade.visible {
        "display:block;"
    } else {
        "display:none;"
    };
    let courses = match results.courses {
        CoursesView::Cards(cards) => cards.into_iter().map(course_card_view).collect_view(),
        CoursesView::Placeholder => {
            view! { <p>{NO_COURSES_MESSAGE}</p> }.into_view()
        }
    };
    view! {
        <div id="overall-grade-display" style=grade_style>
            "Overall Grade: "<span class="grade-value">{results.grade.value}</span>"/100"
        </div>
        <div id="overall-analysis-content" inner_html=results.analysis_html></div>
        <div id="individual-courses-content">{courses}</div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let page = create_rw_signal(PageState::new());
    let (image_file, set_image_file) = create_signal(Option::<File>::None);

    let form_view = move || page.with(|p| p.form.view());
    let section_style = |visible: bool| {
        if visible {
            "display:block;".to_string()
        } else {
            "display:none;".to_string()
        }
    };

    let on_mode = move |ev: leptos::ev::Event| {
        if let Some(input) = input_from(&ev) {
            if input.checked() {
                match input.value().parse::<InputMode>() {
                    Ok(mode) => page.update(|p| p.set_mode(mode)),
                    Err(err) => log_error(&err),
                }
            }
        }
    };

    let on_image = move |ev: leptos::ev::Event| {
        let file = input_from(&ev)
            .and_then(|input| input.files())
            .and_then(|files| files.item(0));
        let selected = file.as_ref().map(|f| SelectedImage { name: f.name() });
        set_image_file.set(file);
        page.update(|p| p.form.select_image(selected));
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let mut submission = None;
        page.update(|p| submission = p.begin_submit());
        let Some(submission) = submission else {
            if let Some(message) = page.with_untracked(|p| p.error().map(str::to_string)) {
                log_error(&message);
            }
            return;
        };
        let image = image_file.get_untracked();
        spawn_local(async move {
            let outcome = fetch::post_submission(&submission, image).await;
            if let Err(err) = &outcome {
                log_error(&format!("Error during analysis: {err}"));
            }
            page.update(|p| p.complete(outcome));
        });
    };

    view! {
        <main class="container">
            <header>
                <h1>"Schedule Analyzer"</h1>
                <p class="note">{"Web version "}{APP_VERSION}</p>
            </header>
            <form id="analyze-form" on:submit=on_submit>
                <label for="api-key">"Gemini API Key"</label>
                <input id="api-key" type="password"
                    prop:value=move || page.with(|p| p.form.api_key.clone())
                    on:input=move |ev| page.update(|p| p.form.api_key = event_target_value(&ev))
                />
                <label for="term-select">"Term"</label>
                <select id="term-select"
                    prop:value=move || page.with(|p| p.form.term_id.clone())
                    on:change=move |ev| page.update(|p| p.form.term_id = event_target_value(&ev))
                >
                    {TERMS.iter().map(|&(id, label)| view! { <option value=id>{label}</option> }).collect_view()}
                </select>
                <div class="input-method">
                    <label><input type="radio" name="inputMethod" value="image"
                        prop:checked=move || form_view().mode == InputMode::Image
                        on:change=on_mode
                    />" Upload image"</label>
                    <label><input type="radio" name="inputMethod" value="manual"
                        prop:checked=move || form_view().mode == InputMode::Manual
                        on:change=on_mode
                    />" Enter courses"</label>
                </div>
                <section id="image-upload-section" style=move || section_style(form_view().image_section_visible)>
                    <label class="dropzone">
                        <span id="file-name">{move || form_view().file_label}</span>
                        <input id="schedule-image" type="file" accept="image/*"
                            required=move || form_view().image_required
                            on:change=on_image
                        />
                    </label>
                </section>
                <section id="manual-input-section" style=move || section_style(form_view().manual_section_visible)>
                    <CourseRows page=page/>
                    <button id="add-course-button" type="button"
                        on:click=move |_| page.update(|p| { p.form.add_row(); })
                    >"Add Course"</button>
                </section>
                <button id="analyze-button" type="submit" disabled=move || page.with(|p| p.submit_disabled())>
                    {move || page.with(|p| p.submit_label())}
                </button>
            </form>
            <div id="loading-indicator" style=move || section_style(page.with(|p| p.loading_visible()))>
                "Analyzing your schedule…"
            </div>
            <section id="results-area" style=move || section_style(page.with(|p| p.results().is_some()))>
                {move || page.with(|p| p.results().cloned()).map(results_view)}
            </section>
            <section id="error-area" style=move || section_style(page.with(|p| p.error().is_some()))>
                <div id="error-output" inner_html=move || page.with(|p| p.error_html()).unwrap_or_default()></div>
            </section>
        </main>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| view! { <App/> });
}

use std::rc::Rc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::config::RuntimeConfig;
use crate::contact::{self, ContactForm, Field, SubmitError, SubmitStatus};
use crate::content::{self, EDUCATION, EXPERIENCE, PROFILE, PROJECTS, SECTIONS, SKILL_CATEGORIES};
use crate::cursor::{trail_dot_style, CursorState};
use crate::dom;
use crate::github::GithubApi;
use crate::hooks::{
    use_counter, use_cursor_listeners, use_preload_schedule, use_section_spy, use_services, use_staggered_reveal,
    use_viewport, CursorHandle, Services, Visibility,
};
use crate::palette::{contribution_color, language_color, share_percent};
use crate::repositories::{weeks, FetchError, RankedRepository, RemoteDataClient, RepositorySummary};
use crate::reveal::format_counter;
use crate::section_spy::{fragment_for, layout_base_offset, SpyConfig};
use crate::viewport::ObserverOptions;

const LIST_STAGGER: Duration = Duration::from_millis(100);
const COUNTER_DURATION: Duration = Duration::from_millis(2_000);
const SPY_ROOT_MARGIN: &str = "-10% 0px -70% 0px";

fn reveal_once() -> ObserverOptions {
    ObserverOptions::default().with_threshold(0.1).trigger_once(true)
}

fn github_client(services: &Services) -> Result<RemoteDataClient<GithubApi>, FetchError> {
    let api = GithubApi::new(&services.config)?;
    Ok(RemoteDataClient::new(api, services.logger))
}

#[derive(Properties, PartialEq)]
struct ExternalLinkProps {
    href: AttrValue,
    label: AttrValue,
}

#[function_component(ExternalLink)]
fn external_link(props: &ExternalLinkProps) -> Html {
    html! {
        <a class="link" href={props.href.clone()} target="_blank" rel="noopener noreferrer">
            {props.label.clone()}
            <span class="external-mark" aria-hidden="true">{"↗"}</span>
            <span class="sr-only">{" (opens in a new tab)"}</span>
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct NavigateProps {
    on_navigate: Callback<String>,
}

fn navigate_to(on_navigate: &Callback<String>, section_id: &'static str) -> Callback<MouseEvent> {
    let on_navigate = on_navigate.clone();
    Callback::from(move |event: MouseEvent| {
        event.prevent_default();
        on_navigate.emit(section_id.to_string());
    })
}

#[derive(Properties, PartialEq)]
struct NavigationProps {
    active_section_id: AttrValue,
    is_scrolled: bool,
    progress_percent: u32,
    on_navigate: Callback<String>,
}

#[function_component(Navigation)]
fn navigation(props: &NavigationProps) -> Html {
    html! {
        <header class={classes!("site-header", props.is_scrolled.then_some("is-scrolled"))}>
            <div
                class="scroll-progress"
                role="progressbar"
                aria-label="Page scroll progress"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow={props.progress_percent.to_string()}
                style={format!("width: {}%;", props.progress_percent)}
            />
            <nav class="site-nav" aria-label="Sections">
                <a class="brand" href="#home" onclick={navigate_to(&props.on_navigate, "home")}>{PROFILE.name}</a>
                <ul class="nav-list">
                    { for SECTIONS.iter().map(|section| {
                        let is_active = props.active_section_id.as_str() == section.id;
                        html! {
                            <li>
                                <a
                                    href={fragment_for(section.id)}
                                    class={classes!("nav-link", is_active.then_some("is-active"))}
                                    aria-current={is_active.then(|| AttrValue::from("location"))}
                                    onclick={navigate_to(&props.on_navigate, section.id)}
                                >
                                    {section.label}
                                </a>
                            </li>
                        }
                    }) }
                </ul>
            </nav>
        </header>
    }
}

#[function_component(HeroSection)]
fn hero_section(props: &NavigateProps) -> Html {
    html! {
        <section id="home" class="section-block hero" aria-labelledby="home-heading">
            <p class="muted">{"Hi, I'm"}</p>
            <h1 id="home-heading">{PROFILE.name}</h1>
            <p class="hero-title">{PROFILE.title}</p>
            <p class="hero-tagline">{PROFILE.tagline}</p>
            <div class="hero-actions">
                <a class="button primary" href="#projects" onclick={navigate_to(&props.on_navigate, "projects")}>
                    {"View my work"}
                </a>
                <a class="button" href="#contact" onclick={navigate_to(&props.on_navigate, "contact")}>
                    {"Get in touch"}
                </a>
            </div>
        </section>
    }
}

#[function_component(AboutSection)]
fn about_section() -> Html {
    html! {
        <section id="about" class="section-block" aria-labelledby="about-heading">
            <h2 id="about-heading">{"About"}</h2>
            <p>{PROFILE.bio}</p>
            <p class="muted">{PROFILE.location}</p>
            <ul class="row-list">
                <li>
                    <ExternalLink href={PROFILE.github_url} label="GitHub" />
                    <span class="muted">{" - Code and experiments"}</span>
                </li>
                <li>
                    <ExternalLink href={PROFILE.linkedin_url} label="LinkedIn" />
                    <span class="muted">{" - Professional profile"}</span>
                </li>
                <li>
                    <ExternalLink href={PROFILE.resume_url} label="Resume" />
                    <span class="muted">{" - Current PDF"}</span>
                </li>
            </ul>
        </section>
    }
}

#[function_component(SkillsSection)]
fn skills_section() -> Html {
    let viewport = use_viewport(reveal_once());
    let reveal = use_staggered_reveal(SKILL_CATEGORIES.len(), LIST_STAGGER, viewport.visibility);

    html! {
        <section id="skills" class="section-block" aria-labelledby="skills-heading" ref={viewport.node_ref.clone()}>
            <h2 id="skills-heading">{"Skills"}</h2>
            <div class="card-grid">
                { for SKILL_CATEGORIES.iter().enumerate().map(|(index, category)| html! {
                    <article class="card skill-card" style={reveal.item_style(index)}>
                        <h3>{category.category}</h3>
                        <ul class="row-list">
                            { for category.skills.iter().map(|skill| html! {
                                <li class="skill-row">
                                    <span>{skill.name}</span>
                                    <span
                                        class="meter"
                                        role="meter"
                                        aria-label={skill.name}
                                        aria-valuemin="0"
                                        aria-valuemax="100"
                                        aria-valuenow={skill.proficiency.to_string()}
                                    >
                                        <span class="meter-fill" style={format!("width: {}%;", skill.proficiency)} />
                                    </span>
                                </li>
                            }) }
                        </ul>
                    </article>
                }) }
            </div>
        </section>
    }
}

#[function_component(ExperienceSection)]
fn experience_section() -> Html {
    let viewport = use_viewport(reveal_once());
    let reveal = use_staggered_reveal(EXPERIENCE.len(), LIST_STAGGER, viewport.visibility);

    html! {
        <section id="experience" class="section-block" aria-labelledby="experience-heading" ref={viewport.node_ref.clone()}>
            <h2 id="experience-heading">{"Experience"}</h2>
            <ol class="timeline">
                { for EXPERIENCE.iter().enumerate().map(|(index, job)| html! {
                    <li class="timeline-entry" style={reveal.item_style(index)}>
                        <h3>{job.role}<span class="muted">{format!(" @ {}", job.company)}</span></h3>
                        <p class="muted">{format!("{} | {}", job.period, job.location)}</p>
                        <ul>
                            { for job.highlights.iter().map(|highlight| html! { <li>{*highlight}</li> }) }
                        </ul>
                        <ul class="inline-list tags">
                            { for job.technologies.iter().map(|tech| html! { <li>{*tech}</li> }) }
                        </ul>
                    </li>
                }) }
            </ol>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct StatCounterProps {
    label: AttrValue,
    target: u64,
    #[prop_or_default]
    suffix: AttrValue,
    trigger: Visibility,
}

#[function_component(StatCounter)]
fn stat_counter(props: &StatCounterProps) -> Html {
    let value = use_counter(props.target as f64, COUNTER_DURATION, props.trigger);

    html! {
        <div class="stat">
            <p class="metric-value">{format_counter(value, 0, "", &props.suffix)}</p>
            <p class="metric-label">{props.label.clone()}</p>
        </div>
    }
}

fn language_bars(summary: &RepositorySummary) -> Html {
    let total: u64 = summary.language_size_by_name.iter().map(|language| language.bytes).sum();

    html! {
        <ul class="row-list language-list">
            { for summary.language_size_by_name.iter().map(|language| {
                let share = share_percent(language.bytes, total);
                let color = language_color(&language.name);
                html! {
                    <li class="language-row">
                        <span class="language-swatch" style={format!("background: {color};")} aria-hidden="true" />
                        <span>{language.name.clone()}</span>
                        <span class="muted">{format!("{share:.1}%")}</span>
                        <span class="meter" aria-hidden="true">
                            <span class="meter-fill" style={format!("width: {share:.1}%; background: {color};")} />
                        </span>
                    </li>
                }
            }) }
        </ul>
    }
}

fn contribution_graph(summary: &RepositorySummary) -> Html {
    let active_days = summary
        .daily_contribution_series
        .iter()
        .filter(|day| day.count > 0)
        .count();

    html! {
        <div
            class="contribution-graph"
            role="img"
            aria-label={format!("Contribution activity: {active_days} active days in the last year")}
        >
            { for weeks(&summary.daily_contribution_series).into_iter().map(|week| html! {
                <div class="contribution-week">
                    { for week.into_iter().map(|day| html! {
                        <span
                            class="contribution-day"
                            title={format!("{}: {} contributions", day.date, day.count)}
                            style={format!("background: {};", contribution_color(day.bucket_level))}
                        />
                    }) }
                </div>
            }) }
        </div>
    }
}

#[function_component(GithubStats)]
fn github_stats() -> Html {
    let services = use_services();
    let summary = use_state(|| None::<RepositorySummary>);
    let viewport = use_viewport(reveal_once());

    {
        let summary = summary.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let next = match github_client(&services) {
                    Ok(client) => client.fetch_summary().await,
                    Err(error) => {
                        services.logger.warn(
                            "summary_fetch_fallback",
                            serde_json::json!({ "error_class": error.error_class() }),
                        );
                        RepositorySummary::fallback(Utc::now().date_naive())
                    }
                };
                summary.set(Some(next));
            });
            || ()
        });
    }

    let trigger = viewport.visibility;
    let (commits, repos, stars, forks) = (*summary)
        .as_ref()
        .map(|summary| {
            (
                summary.total_commits,
                summary.total_repo_count,
                summary.total_star_count,
                summary.total_fork_count,
            )
        })
        .unwrap_or_default();

    html! {
        <div class="github-stats" aria-labelledby="github-heading" ref={viewport.node_ref.clone()}>
            <h3 id="github-heading">{"GitHub activity"}</h3>
            <div class="stat-grid">
                <StatCounter label="Commits" target={commits} suffix="+" {trigger} />
                <StatCounter label="Repositories" target={repos} {trigger} />
                <StatCounter label="Stars" target={stars} {trigger} />
                <StatCounter label="Forks" target={forks} {trigger} />
            </div>
            {
                match (*summary).as_ref() {
                    Some(summary) => html! {
                        <>
                            if summary.is_fallback() {
                                <p class="muted notice">{"Live GitHub data is unavailable right now. Showing sample data."}</p>
                            }
                            <h4>{"Languages"}</h4>
                            {language_bars(summary)}
                            <h4>{"Contributions"}</h4>
                            {contribution_graph(summary)}
                            if summary.contributions_synthetic {
                                <p class="muted">{"Contribution activity is illustrative."}</p>
                            }
                        </>
                    },
                    None => html! { <p class="muted" aria-busy="true">{"Loading GitHub activity..."}</p> },
                }
            }
        </div>
    }
}

#[derive(Clone, PartialEq)]
enum FeaturedState {
    Loading,
    Loaded(Vec<RankedRepository>),
    Failed(String),
}

fn repository_card(item: &RankedRepository) -> Html {
    let repository = &item.repository;
    let homepage = repository
        .homepage
        .clone()
        .filter(|homepage| !homepage.trim().is_empty());

    html! {
        <article class="card repository-card">
            <h4>
                <ExternalLink href={repository.html_url.clone()} label={repository.name.clone()} />
            </h4>
            if let Some(description) = repository.description.clone() {
                <p>{description}</p>
            }
            <p class="muted repository-meta">
                if let Some(language) = repository.language.clone() {
                    <>
                        <span class="language-swatch" style={format!("background: {};", language_color(&language))} aria-hidden="true" />
                        <span>{language}</span>
                    </>
                }
                <span>{format!("★ {}", repository.stargazers_count)}</span>
                <span>{format!("Forks {}", repository.forks_count)}</span>
            </p>
            if let Some(homepage) = homepage {
                <ExternalLink href={homepage} label="Live demo" />
            }
        </article>
    }
}

#[function_component(FeaturedRepositories)]
fn featured_repositories() -> Html {
    let services = use_services();
    let featured = use_state(|| FeaturedState::Loading);

    {
        let featured = featured.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let outcome = match github_client(&services) {
                    Ok(client) => client.fetch_featured_items().await,
                    Err(error) => {
                        services.logger.warn(
                            "featured_fetch_failed",
                            serde_json::json!({ "error_class": error.error_class() }),
                        );
                        Err(error)
                    }
                };
                featured.set(match outcome {
                    Ok(items) => FeaturedState::Loaded(items),
                    Err(error) => FeaturedState::Failed(error.to_string()),
                });
            });
            || ()
        });
    }

    html! {
        <div class="featured-repositories">
            <h3>{"Featured repositories"}</h3>
            {
                match &*featured {
                    FeaturedState::Loading => html! { <p class="muted" aria-busy="true">{"Loading repositories..."}</p> },
                    FeaturedState::Loaded(items) if items.is_empty() => html! {
                        <p class="muted">{"No public repositories to feature yet."}</p>
                    },
                    FeaturedState::Loaded(items) => html! {
                        <div class="card-grid">{ for items.iter().map(repository_card) }</div>
                    },
                    FeaturedState::Failed(message) => html! {
                        <p class="inline-error" role="alert">
                            {format!("Couldn't load repositories: {message}")}
                        </p>
                    },
                }
            }
        </div>
    }
}

#[function_component(ProjectsSection)]
fn projects_section() -> Html {
    let viewport = use_viewport(reveal_once());
    let reveal = use_staggered_reveal(PROJECTS.len(), LIST_STAGGER, viewport.visibility);

    html! {
        <section id="projects" class="section-block" aria-labelledby="projects-heading">
            <h2 id="projects-heading">{"Projects"}</h2>
            <div class="card-grid" ref={viewport.node_ref.clone()}>
                { for PROJECTS.iter().enumerate().map(|(index, project)| html! {
                    <article class="card project-card" style={reveal.item_style(index)}>
                        <h3>{project.title}</h3>
                        <p>{project.description}</p>
                        <ul class="inline-list tags">
                            { for project.technologies.iter().map(|tech| html! { <li>{*tech}</li> }) }
                        </ul>
                        <p class="card-links">
                            <ExternalLink href={project.github_url} label="Source" />
                            if let Some(live_url) = project.live_url {
                                <ExternalLink href={live_url} label="Live" />
                            }
                        </p>
                    </article>
                }) }
            </div>
            <GithubStats />
            <FeaturedRepositories />
        </section>
    }
}

#[function_component(EducationSection)]
fn education_section() -> Html {
    html! {
        <section id="education" class="section-block" aria-labelledby="education-heading">
            <h2 id="education-heading">{"Education"}</h2>
            <article class="card">
                <h3>{EDUCATION.degree}</h3>
                <p>{EDUCATION.institution}</p>
                <p class="muted">{format!("{} | {}", EDUCATION.years, EDUCATION.grade)}</p>
                <ul>
                    { for EDUCATION.highlights.iter().map(|highlight| html! { <li>{*highlight}</li> }) }
                </ul>
            </article>
        </section>
    }
}

pub enum ContactAction {
    Edit(Field, String),
    Blur(Field),
    Begin,
    Finish(Result<(), SubmitError>),
}

impl Reducible for ContactForm {
    type Action = ContactAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ContactAction::Edit(field, value) => next.edit(field, value),
            ContactAction::Blur(field) => next.blur(field),
            ContactAction::Begin => {
                next.begin_submit();
            }
            ContactAction::Finish(outcome) => next.finish_submit(outcome),
        }

        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

fn form_field(form: &UseReducerHandle<ContactForm>, field: Field) -> Html {
    let id = format!("contact-{}", field.as_str());
    let error_id = format!("{id}-error");
    let value = form.values().value(field).to_string();
    let error = form.error(field).map(str::to_string);
    let invalid = error.is_some().to_string();
    let described_by = error.is_some().then(|| AttrValue::from(error_id.clone()));

    let oninput = {
        let form = form.clone();
        Callback::from(move |event: InputEvent| {
            let value = match field {
                Field::Message => event.target_unchecked_into::<HtmlTextAreaElement>().value(),
                _ => event.target_unchecked_into::<HtmlInputElement>().value(),
            };
            form.dispatch(ContactAction::Edit(field, value));
        })
    };
    let onblur = {
        let form = form.clone();
        Callback::from(move |_: FocusEvent| form.dispatch(ContactAction::Blur(field)))
    };

    let control = match field {
        Field::Message => html! {
            <textarea
                id={id.clone()}
                name={field.as_str()}
                rows="6"
                {value}
                {oninput}
                {onblur}
                aria-invalid={invalid}
                aria-describedby={described_by}
                disabled={form.is_submitting()}
            />
        },
        _ => html! {
            <input
                id={id.clone()}
                name={field.as_str()}
                type={if field == Field::Email { "email" } else { "text" }}
                {value}
                {oninput}
                {onblur}
                aria-invalid={invalid}
                aria-describedby={described_by}
                disabled={form.is_submitting()}
            />
        },
    };

    html! {
        <div class={classes!("form-field", error.is_some().then_some("has-error"))}>
            <label for={id}>{field.label()}</label>
            {control}
            if let Some(error) = error {
                <p id={error_id} class="field-error">{error}</p>
            }
        </div>
    }
}

#[function_component(ContactSection)]
fn contact_section() -> Html {
    let services = use_services();
    let form = use_reducer_eq(ContactForm::default);

    let onsubmit = {
        let form = form.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            let message = (*form).clone().begin_submit();
            form.dispatch(ContactAction::Begin);
            let Some(message) = message else {
                return;
            };

            let dispatcher = form.dispatcher();
            let config = Rc::clone(&services.config);
            let logger = services.logger;
            spawn_local(async move {
                let outcome =
                    contact::submit(&message, config.contact_endpoint.as_ref(), config.submit_delay, logger).await;
                dispatcher.dispatch(ContactAction::Finish(outcome));
            });
        })
    };

    let status_class = match form.status() {
        SubmitStatus::Success => Some("is-success"),
        SubmitStatus::Failed(_) => Some("is-error"),
        SubmitStatus::Idle | SubmitStatus::Submitting => None,
    };

    html! {
        <section id="contact" class="section-block" aria-labelledby="contact-heading">
            <h2 id="contact-heading">{"Contact"}</h2>
            <p>
                {"Have a project in mind or just want to say hello? Reach me at "}
                <a class="link" href={format!("mailto:{}", PROFILE.email)}>{PROFILE.email}</a>
                {" or use the form below."}
            </p>
            <form class="contact-form" novalidate={true} {onsubmit}>
                { for Field::ALL.into_iter().map(|field| form_field(&form, field)) }
                <button class="button primary" type="submit" disabled={form.is_submitting()}>
                    { if form.is_submitting() { "Sending..." } else { "Send message" } }
                </button>
                if let Some(message) = form.status().message() {
                    <p class={classes!("form-status", status_class)} role="status">{message.to_string()}</p>
                }
            </form>
        </section>
    }
}

#[function_component(CustomCursor)]
fn custom_cursor() -> Html {
    let Some(cursor) = use_context::<CursorHandle>() else {
        return Html::default();
    };

    let (x, y) = cursor.position();
    let trail_len = cursor.trail().count();

    html! {
        <div
            class={classes!(
                "cursor-layer",
                cursor.is_hidden().then_some("is-hidden"),
                cursor.is_pointer().then_some("is-pointer"),
            )}
            aria-hidden="true"
        >
            { for cursor.trail().enumerate().map(|(index, point)| {
                let (opacity, scale) = trail_dot_style(trail_len - 1 - index);
                html! {
                    <span
                        class="cursor-trail"
                        style={format!(
                            "transform: translate({:.1}px, {:.1}px) scale({scale:.2}); opacity: {opacity:.2};",
                            point.x, point.y
                        )}
                    />
                }
            }) }
            <span class="cursor-ring" style={format!("transform: translate({x:.1}px, {y:.1}px);")} />
            <span class="cursor-dot" style={format!("transform: translate({x:.1}px, {y:.1}px);")} />
        </div>
    }
}

#[function_component(Page)]
fn page() -> Html {
    let section_ids: Vec<String> = content::section_ids().map(str::to_string).collect();
    let spy = use_section_spy(
        section_ids,
        SpyConfig {
            base_offset_px: layout_base_offset(dom::viewport_width()),
            root_margin: SPY_ROOT_MARGIN.to_string(),
        },
    );
    use_preload_schedule();

    let cursor = use_reducer_eq(CursorState::default);
    use_cursor_listeners(&cursor);

    html! {
        <ContextProvider<CursorHandle> context={cursor.clone()}>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <Navigation
                active_section_id={spy.active_section_id.clone()}
                is_scrolled={spy.scroll.is_past_threshold}
                progress_percent={spy.scroll.progress_percent()}
                on_navigate={spy.scroll_to_section.clone()}
            />
            <main id="content" class="page-shell">
                <HeroSection on_navigate={spy.scroll_to_section.clone()} />
                <AboutSection />
                <SkillsSection />
                <ExperienceSection />
                <ProjectsSection />
                <EducationSection />
                <ContactSection />
            </main>
            <footer class="site-footer">
                <p class="muted">{format!("© {} {}", Utc::now().year(), PROFILE.name)}</p>
            </footer>
            <CustomCursor />
        </ContextProvider<CursorHandle>>
    }
}

#[function_component(App)]
fn app() -> Html {
    let services = use_memo((), |_| Services::new(RuntimeConfig::from_build_env()));

    html! {
        <ContextProvider<Services> context={(*services).clone()}>
            <Page />
        </ContextProvider<Services>>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
